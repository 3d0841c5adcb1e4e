//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{Cell, GameSnapshot, Outcome, TileContent};
use crate::fb::{FrameBuffer, Glyph, GlyphStyle, Rgb};
use crate::types::{BoosterKind, Coord, ElementKind, HelperKind};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub client_count: u16,
    pub controller_id: Option<usize>,
}

/// Where the board landed on screen, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    /// Top-left terminal cell of tile (0, 0).
    pub origin_x: u16,
    pub origin_y: u16,
    pub cell_w: u16,
    pub cell_h: u16,
    pub cols: u8,
    pub rows: u8,
}

impl BoardLayout {
    /// Tile under a terminal cell, if any.
    pub fn tile_at(&self, column: u16, row: u16) -> Option<Coord> {
        let dx = column.checked_sub(self.origin_x)? / self.cell_w;
        let dy = row.checked_sub(self.origin_y)? / self.cell_h;
        if dx >= self.cols as u16 || dy >= self.rows as u16 {
            return None;
        }
        Some(Coord::new(dx as i8, dy as i8))
    }
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);

const PALETTE: [Rgb; 8] = [
    Rgb::new(80, 170, 240),
    Rgb::new(240, 200, 60),
    Rgb::new(110, 210, 110),
    Rgb::new(220, 90, 200),
    Rgb::new(240, 110, 80),
    Rgb::new(80, 220, 210),
    Rgb::new(180, 140, 250),
    Rgb::new(230, 230, 230),
];

fn element_color(kind: ElementKind) -> Rgb {
    PALETTE[kind.index() % PALETTE.len()]
}

fn element_letter(snap: &GameSnapshot, kind: ElementKind) -> char {
    snap.elements
        .get(kind.index())
        .and_then(|name| name.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?')
}

fn helper_glyph(helper: HelperKind) -> char {
    match helper {
        HelperKind::LineHorizontal => '↔',
        HelperKind::LineVertical => '↕',
        HelperKind::ColorBomb => '◉',
    }
}

/// Terminal renderer for one level.
pub struct GameView {
    /// Tile width in terminal columns.
    cell_w: u16,
    /// Tile height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 4x2 comes out roughly square with typical glyph aspect ratios.
        Self {
            cell_w: 4,
            cell_h: 2,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Board placement for `snap` in `viewport`, centered with a one-cell frame.
    pub fn layout(&self, snap: &GameSnapshot, viewport: Viewport) -> BoardLayout {
        let frame_w = snap.cols as u16 * self.cell_w + 2;
        let frame_h = snap.rows as u16 * self.cell_h + 2;
        let start_x = viewport.width.saturating_sub(frame_w + PANEL_W) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;
        BoardLayout {
            origin_x: start_x + 1,
            origin_y: start_y + 1,
            cell_w: self.cell_w,
            cell_h: self.cell_h,
            cols: snap.cols,
            rows: snap.rows,
        }
    }

    /// Render into an existing framebuffer, resizing it to `viewport`.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) -> BoardLayout {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Glyph::default());

        let layout = self.layout(snap, viewport);
        let frame_x = layout.origin_x - 1;
        let frame_y = layout.origin_y - 1;
        let frame_w = snap.cols as u16 * self.cell_w + 2;
        let frame_h = snap.rows as u16 * self.cell_h + 2;

        draw_border(
            fb,
            frame_x,
            frame_y,
            frame_w,
            frame_h,
            GlyphStyle::new(Rgb::new(200, 200, 200), PANEL_BG),
        );

        for row in 0..snap.rows as i8 {
            for col in 0..snap.cols as i8 {
                let at = Coord::new(col, row);
                if let Some(cell) = snap.cell(at) {
                    let selected = snap.selection == Some(at);
                    self.draw_cell(fb, &layout, snap, at, cell, selected);
                }
            }
        }

        self.draw_side_panel(fb, snap, adapter, viewport, frame_x + frame_w + 2, frame_y);

        match snap.outcome {
            Outcome::Won => draw_overlay_text(fb, frame_x, frame_y, frame_w, frame_h, "LEVEL COMPLETE"),
            Outcome::Lost => draw_overlay_text(fb, frame_x, frame_y, frame_w, frame_h, "OUT OF MOVES"),
            Outcome::InProgress => {}
        }
        layout
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, None, viewport, &mut fb);
        fb
    }

    fn draw_cell(
        &self,
        fb: &mut FrameBuffer,
        layout: &BoardLayout,
        snap: &GameSnapshot,
        at: Coord,
        cell: Cell,
        selected: bool,
    ) {
        let px = layout.origin_x + at.col as u16 * self.cell_w;
        let py = layout.origin_y + at.row as u16 * self.cell_h;

        let (fill, mark, mut style) = match cell {
            Cell::Hole => (' ', None, GlyphStyle::new(PANEL_BG, PANEL_BG)),
            Cell::Empty => (
                '·',
                None,
                GlyphStyle::new(Rgb::new(90, 90, 100), BOARD_BG).dim(),
            ),
            Cell::Box { strength } => (
                if strength > 1 { '▓' } else { '▒' },
                None,
                GlyphStyle::new(Rgb::new(170, 120, 60), Rgb::new(70, 45, 20)),
            ),
            Cell::Tile(tile) => match tile.content {
                TileContent::Helper(helper) => (
                    ' ',
                    Some(helper_glyph(helper)),
                    GlyphStyle::new(Rgb::new(255, 255, 255), Rgb::new(90, 60, 120)).bold(),
                ),
                TileContent::Element(kind) => {
                    let bg = match tile.ice {
                        Some(s) if s > 1 => Rgb::new(150, 200, 235),
                        Some(_) => Rgb::new(200, 230, 250),
                        None => BOARD_BG,
                    };
                    (
                        ' ',
                        Some(element_letter(snap, kind)),
                        GlyphStyle::new(element_color(kind), bg).bold(),
                    )
                }
            },
        };

        if selected {
            style = GlyphStyle::new(BOARD_BG, style.fg).bold();
        }
        fb.fill_rect(px, py, self.cell_w, self.cell_h, fill, style);
        if let Some(ch) = mark {
            fb.put_char(px + (self.cell_w - 1) / 2, py + (self.cell_h - 1) / 2, ch, style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = GlyphStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = GlyphStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = value.dim();

        let mut y = start_y;
        fb.put_str(panel_x, y, &snap.level_name, label);
        y += 2;

        fb.put_str(panel_x, y, "MOVES", label);
        fb.put_u32(panel_x + 7, y, snap.moves_left, value);
        y += 1;
        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_u32(panel_x + 7, y, snap.score, value);
        y += 2;

        fb.put_str(panel_x, y, "GOALS", label);
        y += 1;
        for goal in &snap.goals {
            let style = if goal.remaining == 0 { dim } else { value };
            let x = fb.put_str(panel_x, y, &goal.name, style);
            if goal.remaining == 0 {
                fb.put_char(x + 1, y, '✓', style);
            }
            fb.put_u32(x + 2, y, goal.remaining, style);
            y += 1;
        }
        y += 1;

        fb.put_str(panel_x, y, "BOOSTERS", label);
        y += 1;
        for (key, kind) in ['1', '2', '3'].into_iter().zip(BoosterKind::ALL) {
            let armed = snap.boosters.armed == Some(kind);
            let style = if armed { label } else { value };
            fb.put_char(panel_x, y, if armed { '>' } else { key }, style);
            let x = fb.put_str(panel_x + 2, y, kind.as_str(), style);
            fb.put_char(x + 1, y, 'x', dim);
            fb.put_u32(x + 2, y, snap.boosters.count(kind), style);
            y += 1;
        }
        y += 1;

        fb.put_str(panel_x, y, "AI", label);
        match adapter {
            Some(st) => {
                let x = fb.put_str(panel_x + 3, y, "clients ", value);
                fb.put_u32(x, y, st.client_count as u32, value);
                if st.controller_id.is_some() {
                    fb.put_str(panel_x + 3, y + 1, "controlled", dim);
                }
            }
            None => {
                fb.put_str(panel_x + 3, y, "off", dim);
            }
        }
        y += 3;

        if y < viewport.height {
            fb.put_str(panel_x, y, "esc disarm  r restart  q quit", dim);
        }
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: GlyphStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, text: &str) {
    let text_w = text.chars().count() as u16;
    let style = GlyphStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
    fb.put_str(
        x.saturating_add(w.saturating_sub(text_w) / 2),
        y.saturating_add(h / 2),
        text,
        style,
    );
}

/// Columns reserved right of the board for the side panel.
const PANEL_W: u16 = 32;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoosterSnapshot, GoalSnapshot, Tile};
    use crate::types::GoalKind;

    fn snapshot() -> GameSnapshot {
        let mut cells = vec![Cell::Tile(Tile::element(ElementKind(0))); 9];
        cells[1] = Cell::Hole;
        cells[4] = Cell::Box { strength: 2 };
        cells[8] = Cell::Tile(Tile::helper(HelperKind::ColorBomb));
        GameSnapshot {
            level_id: 1,
            level_name: "Test".into(),
            episode_id: 0,
            seed: 0,
            cols: 3,
            rows: 3,
            cells,
            elements: vec!["apple".into(), "bell".into(), "cake".into()],
            moves_left: 12,
            score: 40,
            goals: vec![GoalSnapshot {
                kind: GoalKind::Element(ElementKind(0)),
                name: "apple".into(),
                target: 5,
                remaining: 3,
            }],
            boosters: BoosterSnapshot {
                wand: 2,
                hammer: 0,
                glove: 1,
                armed: Some(BoosterKind::Glove),
            },
            selection: None,
            outcome: Outcome::InProgress,
        }
    }

    fn screen_text(fb: &FrameBuffer) -> String {
        (0..fb.height()).map(|y| fb.row_text(y) + "\n").collect()
    }

    #[test]
    fn test_layout_maps_terminal_cells_to_tiles() {
        let view = GameView::default();
        let snap = snapshot();
        let layout = view.layout(&snap, Viewport::new(80, 24));
        assert_eq!(layout.tile_at(layout.origin_x, layout.origin_y), Some(Coord::new(0, 0)));
        assert_eq!(
            layout.tile_at(layout.origin_x + 4 * 2 + 3, layout.origin_y + 2 * 2 + 1),
            Some(Coord::new(2, 2))
        );
        assert_eq!(layout.tile_at(layout.origin_x + 12, layout.origin_y), None);
        assert_eq!(layout.tile_at(0, 0), None);
    }

    #[test]
    fn test_board_glyphs_and_panel() {
        let view = GameView::default();
        let snap = snapshot();
        let fb = view.render(&snap, Viewport::new(80, 24));
        let text = screen_text(&fb);
        assert!(text.contains('A'));
        assert!(text.contains('▓'));
        assert!(text.contains('◉'));
        assert!(text.contains("MOVES  12"));
        assert!(text.contains("SCORE  40"));
        assert!(text.contains("apple  3"));
        assert!(text.contains("> glove x1"));
        assert!(!text.contains("LEVEL COMPLETE"));
    }

    #[test]
    fn test_outcome_overlay() {
        let view = GameView::default();
        let mut snap = snapshot();
        snap.outcome = Outcome::Won;
        let text = screen_text(&view.render(&snap, Viewport::new(80, 24)));
        assert!(text.contains("LEVEL COMPLETE"));
        snap.outcome = Outcome::Lost;
        let text = screen_text(&view.render(&snap, Viewport::new(80, 24)));
        assert!(text.contains("OUT OF MOVES"));
    }

    #[test]
    fn test_tiny_viewport_does_not_panic() {
        let view = GameView::default();
        let fb = view.render(&snapshot(), Viewport::new(5, 3));
        assert_eq!((fb.width(), fb.height()), (5, 3));
    }
}
