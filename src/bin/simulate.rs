//! Headless level driver.
//!
//! Plays a level many times with random swipes on free tiles and reports
//! how each game ended. Useful for checking that a level is winnable and
//! that its boards never wedge the reshuffle cap.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tile_match::core::{ActionOutcome, GameState, LevelDefinition, Outcome, SeededRng, TileRng};
use tile_match::types::{Coord, Direction, Gesture};

/// Pointer events one game may use before it counts as stuck.
const MAX_GESTURES_PER_GAME: u32 = 20_000;

const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

#[derive(Debug, Parser)]
#[command(name = "tile-match-sim", version, about = "Play a level headless with random swipes.")]
struct Cli {
    /// Level definition (JSON). Uses the bundled tutorial when omitted.
    #[arg(short, long, value_name = "FILE")]
    level: Option<PathBuf>,

    /// Number of games to play; game `i` uses seed `seed + i`.
    #[arg(short, long, default_value_t = 100)]
    games: u32,

    /// First seed.
    #[arg(short, long, default_value_t = 1)]
    seed: u64,
}

#[derive(Debug, Default)]
struct Summary {
    won: u32,
    lost: u32,
    total_score: u64,
    reverted: u32,
    resolved: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let level = load_level(cli.level.as_deref())?;
    info!(level = level.id, games = cli.games, "simulating");

    let mut summary = Summary::default();
    for i in 0..cli.games {
        let seed = cli.seed.wrapping_add(i as u64);
        let game = GameState::new(level.clone(), seed).context("building level")?;
        play(game, seed, &mut summary).with_context(|| format!("game {i} (seed {seed})"))?;
    }

    let played = summary.won + summary.lost;
    println!("games:    {played}");
    println!("won:      {}", summary.won);
    println!("lost:     {}", summary.lost);
    if played > 0 {
        println!("avg score: {:.1}", summary.total_score as f64 / played as f64);
    }
    println!("swaps:    {} resolved, {} reverted", summary.resolved, summary.reverted);
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

fn play(mut game: GameState, seed: u64, summary: &mut Summary) -> Result<()> {
    // Gesture choice has its own stream so it does not perturb refills.
    let mut rng = SeededRng::new(seed ^ 0x5eed_cafe);
    let cols = game.board().cols() as usize;
    let rows = game.board().rows() as usize;

    for _ in 0..MAX_GESTURES_PER_GAME {
        match game.outcome() {
            Outcome::Won => {
                summary.won += 1;
                summary.total_score += game.score() as u64;
                debug!(seed, score = game.score(), "won");
                return Ok(());
            }
            Outcome::Lost => {
                summary.lost += 1;
                summary.total_score += game.score() as u64;
                debug!(seed, score = game.score(), "lost");
                return Ok(());
            }
            Outcome::InProgress => {}
        }

        let at = Coord::new(rng.pick(cols) as i8, rng.pick(rows) as i8);
        let gesture = Gesture::Swipe(DIRECTIONS[rng.pick(DIRECTIONS.len())]);
        match game.pointer(at, gesture)? {
            ActionOutcome::Reverted => summary.reverted += 1,
            ActionOutcome::Resolved { .. } => summary.resolved += 1,
            _ => {}
        }
    }
    bail!("no outcome after {MAX_GESTURES_PER_GAME} gestures")
}
