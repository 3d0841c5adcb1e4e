//! Terminal match-3 runner (default binary).
//!
//! Plays one level with the mouse: a left press is pointer-down, the release
//! is pointer-up, and the travel between them decides tap or swipe. Boosters
//! are armed from the keyboard. Rendering uses the framebuffer renderer in
//! `tile_match::term`; logs go to a file so the screen stays clean.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tile_match::adapter::Adapter;
use tile_match::core::{BoosterInventory, GameState, LevelDefinition, TracingSink};
use tile_match::input::{
    handle_key_event, handle_mouse_event, should_quit, GridTransform, KeyCommand, Point,
    PointerEvent, PointerTracker, TERM_CELL_PX,
};
use tile_match::term::{AdapterStatusView, BoardLayout, FrameBuffer, GameView, TerminalRenderer, Viewport};

const POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "tile-match", version, about = "Match-3 puzzle in the terminal, played with the mouse.")]
struct Cli {
    /// Level definition (JSON). Plays the bundled tutorial when omitted.
    #[arg(short, long, value_name = "FILE")]
    level: Option<PathBuf>,

    /// Seed for random cells, refills and reshuffles.
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Starting count of each booster (wand, hammer, glove).
    #[arg(long, default_value_t = 3, value_name = "N")]
    boosters: u32,

    /// Accept AI clients over TCP (see TILE_MATCH_AI_* variables).
    #[arg(long)]
    adapter: bool,

    /// Where to write logs; RUST_LOG picks the filter.
    #[arg(long, default_value = "tile-match.log", value_name = "FILE")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let level = load_level(cli.level.as_deref())?;
    info!(level = level.id, name = %level.name, seed = cli.seed, "starting");
    let mut game = GameState::new(level, cli.seed)
        .context("building level")?
        .with_sink(TracingSink)
        .with_boosters(BoosterInventory::new(cli.boosters, cli.boosters, cli.boosters));

    let mut adapter = if cli.adapter {
        Adapter::start_from_env().context("starting adapter")?
    } else {
        None
    };
    if let Some(a) = &adapter {
        info!(addr = %a.local_addr(), "adapter ready");
    }

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut game, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn load_level(path: Option<&Path>) -> Result<LevelDefinition> {
    let Some(path) = path else {
        return LevelDefinition::tutorial().context("loading bundled tutorial");
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading level {}", path.display()))?;
    LevelDefinition::from_json(&json).with_context(|| format!("loading level {}", path.display()))
}

/// Pointer space for the board as laid out on screen.
fn board_transform(layout: &BoardLayout) -> GridTransform {
    GridTransform::new(
        Point::new(
            layout.origin_x as f32 * TERM_CELL_PX.0,
            layout.origin_y as f32 * TERM_CELL_PX.1,
        ),
        layout.cell_w as f32 * TERM_CELL_PX.0,
        layout.cell_h as f32 * TERM_CELL_PX.1,
        layout.cols,
        layout.rows,
    )
}

fn run(term: &mut TerminalRenderer, game: &mut GameState, mut adapter: Option<&mut Adapter>) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut tracker = PointerTracker::new();
    let mut status: Option<AdapterStatusView> = None;
    let mut layout: Option<BoardLayout> = None;
    let mut dirty = true;

    loop {
        if let Some(a) = adapter.as_deref_mut() {
            while let Some(cmd) = a.try_recv() {
                dirty |= a.handle(game, cmd);
            }
            if let Some((clients, controller_id)) = a.status() {
                let now = AdapterStatusView {
                    client_count: clients.min(u16::MAX as usize) as u16,
                    controller_id,
                };
                if status != Some(now) {
                    status = Some(now);
                    dirty = true;
                }
            }
        }

        if dirty {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            let snap = game.snapshot();
            layout = Some(view.render_into(&snap, status.as_ref(), Viewport::new(w, h), &mut fb));
            term.draw_swap(&mut fb)?;
            dirty = false;
        }

        if !event::poll(POLL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    return Ok(());
                }
                let Some(command) = handle_key_event(key) else {
                    continue;
                };
                match command {
                    KeyCommand::Arm(booster) => {
                        if !game.arm_booster(booster) {
                            debug!(?booster, "booster unavailable");
                        }
                    }
                    KeyCommand::Disarm => game.disarm_booster(),
                    KeyCommand::Restart => {
                        tracker.cancel();
                        game.restart().context("restarting level")?;
                    }
                }
                if let Some(a) = adapter.as_deref_mut() {
                    a.broadcast(game);
                }
                dirty = true;
            }
            Event::Mouse(mouse) => match (handle_mouse_event(mouse), layout.as_ref()) {
                (Some(PointerEvent::Down(p)), Some(layout)) => {
                    tracker.press(&board_transform(layout), p);
                }
                (Some(PointerEvent::Up(p)), _) => {
                    if let Some((at, gesture)) = tracker.release(p) {
                        let outcome = game.pointer(at, gesture)?;
                        debug!(?at, ?gesture, ?outcome, "pointer");
                        if let Some(a) = adapter.as_deref_mut() {
                            a.broadcast(game);
                        }
                        dirty = true;
                    }
                }
                _ => {}
            },
            Event::Resize(..) => {
                term.invalidate();
                tracker.cancel();
                dirty = true;
            }
            _ => {}
        }
    }
}
