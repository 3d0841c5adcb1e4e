//! Board module - owns the grid of cells
//!
//! The board is a `cols x rows` grid stored as a flat row-major vector.
//! Every read and write goes through [`Board::get`] / [`Board::set`]; other
//! modules never index the storage directly.
//!
//! Holes are declared once, at construction, and can never receive content.
//! Writing to a hole or outside the grid is a programmer error and panics.
//!
//! # Fixture grammar
//!
//! [`Board::from_ascii`] parses whitespace-separated tokens, one text line per row:
//!
//! | token | cell |
//! |-------|------|
//! | `A`..`Z` | element tile of kind 0..25 |
//! | `A~`, `A~~` | element under ice of strength 1 or 2 |
//! | `.` | empty |
//! | `#` | hole |
//! | `[1]`, `[2]` | box of strength 1 or 2 |
//! | `-`, `\|` | horizontal / vertical line helper |
//! | `@` | color bomb |

use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::types::{Coord, ElementKind, HelperKind, MAX_BOARD_EDGE};

/// What a tile is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileContent {
    Element(ElementKind),
    Helper(HelperKind),
}

/// A tile, optionally frozen under ice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub content: TileContent,
    /// Remaining ice strength; `None` when the tile is free.
    pub ice: Option<u8>,
}

impl Tile {
    pub fn element(kind: ElementKind) -> Self {
        Self {
            content: TileContent::Element(kind),
            ice: None,
        }
    }

    pub fn iced(kind: ElementKind, strength: u8) -> Self {
        Self {
            content: TileContent::Element(kind),
            ice: Some(strength),
        }
    }

    pub fn helper(kind: HelperKind) -> Self {
        Self {
            content: TileContent::Helper(kind),
            ice: None,
        }
    }

    pub fn element_kind(&self) -> Option<ElementKind> {
        match self.content {
            TileContent::Element(kind) => Some(kind),
            TileContent::Helper(_) => None,
        }
    }

    pub fn helper_kind(&self) -> Option<HelperKind> {
        match self.content {
            TileContent::Helper(kind) => Some(kind),
            TileContent::Element(_) => None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.ice.is_some()
    }

    /// Kind used for matching: only free element tiles have one.
    pub fn matchable_kind(&self) -> Option<ElementKind> {
        if self.is_frozen() {
            return None;
        }
        self.element_kind()
    }
}

/// One grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "cell", rename_all = "snake_case")]
pub enum Cell {
    /// Permanently void.
    Hole,
    /// Awaiting gravity or refill.
    Empty,
    Tile(Tile),
    Box { strength: u8 },
}

impl Cell {
    pub fn tile(&self) -> Option<&Tile> {
        match self {
            Cell::Tile(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Holds something gravity should move.
    pub fn is_occupied(&self) -> bool {
        matches!(self, Cell::Tile(_) | Cell::Box { .. })
    }

    /// Ice or box currently protecting this cell from selection and swaps.
    pub fn is_obstacle(&self) -> bool {
        match self {
            Cell::Box { .. } => true,
            Cell::Tile(t) => t.is_frozen(),
            _ => false,
        }
    }

    pub fn matchable_kind(&self) -> Option<ElementKind> {
        self.tile().and_then(Tile::matchable_kind)
    }

    pub fn helper_kind(&self) -> Option<HelperKind> {
        self.tile().and_then(Tile::helper_kind)
    }

    /// A tile a player may pick up: free element or helper.
    pub fn is_swappable(&self) -> bool {
        matches!(self, Cell::Tile(t) if !t.is_frozen())
    }
}

/// The match-3 grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cols: u8,
    rows: u8,
    /// Row-major (row * cols + col).
    cells: Vec<Cell>,
}

impl Board {
    /// Create an all-empty board.
    pub fn new(cols: u8, rows: u8) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Cell::Empty; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    #[inline(always)]
    fn index(&self, at: Coord) -> Option<usize> {
        if at.col < 0 || at.row < 0 || at.col >= self.cols as i8 || at.row >= self.rows as i8 {
            return None;
        }
        Some(at.row as usize * self.cols as usize + at.col as usize)
    }

    #[inline(always)]
    fn index_or_panic(&self, at: Coord) -> usize {
        match self.index(at) {
            Some(i) => i,
            None => panic!(
                "coordinate ({}, {}) outside {}x{} board",
                at.col, at.row, self.cols, self.rows
            ),
        }
    }

    pub fn in_bounds(&self, at: Coord) -> bool {
        self.index(at).is_some()
    }

    /// Cell at `at`. Panics when out of bounds.
    pub fn get(&self, at: Coord) -> Cell {
        self.cells[self.index_or_panic(at)]
    }

    /// Cell at `at`, or `None` off the grid. For neighbor lookups.
    pub fn try_get(&self, at: Coord) -> Option<Cell> {
        self.index(at).map(|i| self.cells[i])
    }

    /// Write `cell` at `at`.
    ///
    /// Panics when out of bounds, when `at` is a hole, or when `cell` is
    /// itself a hole (use [`Board::make_hole`] during construction).
    pub fn set(&mut self, at: Coord, cell: Cell) {
        let i = self.index_or_panic(at);
        assert!(
            self.cells[i] != Cell::Hole,
            "hole at ({}, {}) cannot receive content",
            at.col,
            at.row
        );
        assert!(cell != Cell::Hole, "holes are declared with make_hole");
        self.cells[i] = cell;
    }

    /// Mark `at` permanently void. Construction only.
    pub fn make_hole(&mut self, at: Coord) {
        let i = self.index_or_panic(at);
        self.cells[i] = Cell::Hole;
    }

    pub fn is_hole(&self, at: Coord) -> bool {
        self.get(at) == Cell::Hole
    }

    /// Exchange two non-hole cells.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let ca = self.get(a);
        let cb = self.get(b);
        self.set(a, cb);
        self.set(b, ca);
    }

    /// All coordinates, rows top-to-bottom, left-to-right within a row.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let cols = self.cols as i8;
        let rows = self.rows as i8;
        (0..rows).flat_map(move |row| (0..cols).map(move |col| Coord::new(col, row)))
    }

    /// In-bounds orthogonal neighbors of `at`.
    pub fn neighbors(&self, at: Coord) -> impl Iterator<Item = Coord> + '_ {
        at.neighbors4().into_iter().filter(move |c| self.in_bounds(*c))
    }

    /// Number of free or frozen element tiles of `kind`.
    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.cells
            .iter()
            .filter(|c| c.tile().and_then(Tile::element_kind) == Some(kind))
            .count()
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// Parse a fixture board. See the module docs for the grammar.
    pub fn from_ascii(text: &str) -> Result<Self, LevelError> {
        let lines: Vec<Vec<&str>> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| l.split_whitespace().collect())
            .collect();

        let rows = lines.len();
        let cols = lines.first().map(Vec::len).unwrap_or(0);
        let edge = MAX_BOARD_EDGE as usize;
        if rows == 0 || cols == 0 || rows > edge || cols > edge {
            return Err(LevelError::Dimensions {
                cols: cols.min(u8::MAX as usize) as u8,
                rows: rows.min(u8::MAX as usize) as u8,
                max: MAX_BOARD_EDGE,
            });
        }

        let mut board = Board::new(cols as u8, rows as u8);
        for (row, tokens) in lines.iter().enumerate() {
            if tokens.len() != cols {
                return Err(LevelError::RowWidth {
                    row,
                    expected: cols as u8,
                    found: tokens.len(),
                });
            }
            for (col, token) in tokens.iter().enumerate() {
                let at = Coord::new(col as i8, row as i8);
                let cell = parse_token(token).ok_or_else(|| LevelError::Fixture {
                    line: row + 1,
                    token: (*token).to_string(),
                })?;
                match cell {
                    Cell::Hole => board.make_hole(at),
                    other => board.set(at, other),
                }
            }
        }
        Ok(board)
    }

    /// Render in the fixture grammar.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 3);
        for row in 0..self.rows as i8 {
            for col in 0..self.cols as i8 {
                if col > 0 {
                    out.push(' ');
                }
                out.push_str(&cell_token(self.get(Coord::new(col, row))));
            }
            out.push('\n');
        }
        out
    }
}

fn parse_token(token: &str) -> Option<Cell> {
    match token {
        "." => return Some(Cell::Empty),
        "#" => return Some(Cell::Hole),
        "-" => return Some(Cell::Tile(Tile::helper(HelperKind::LineHorizontal))),
        "|" => return Some(Cell::Tile(Tile::helper(HelperKind::LineVertical))),
        "@" => return Some(Cell::Tile(Tile::helper(HelperKind::ColorBomb))),
        "[1]" => return Some(Cell::Box { strength: 1 }),
        "[2]" => return Some(Cell::Box { strength: 2 }),
        _ => {}
    }

    let mut chars = token.chars();
    let letter = chars.next()?;
    if !letter.is_ascii_uppercase() {
        return None;
    }
    let kind = ElementKind(letter as u8 - b'A');
    match chars.as_str() {
        "" => Some(Cell::Tile(Tile::element(kind))),
        "~" => Some(Cell::Tile(Tile::iced(kind, 1))),
        "~~" => Some(Cell::Tile(Tile::iced(kind, 2))),
        _ => None,
    }
}

fn cell_token(cell: Cell) -> String {
    match cell {
        Cell::Hole => "#".to_string(),
        Cell::Empty => ".".to_string(),
        Cell::Box { strength } => format!("[{strength}]"),
        Cell::Tile(tile) => match tile.content {
            TileContent::Helper(HelperKind::LineHorizontal) => "-".to_string(),
            TileContent::Helper(HelperKind::LineVertical) => "|".to_string(),
            TileContent::Helper(HelperKind::ColorBomb) => "@".to_string(),
            TileContent::Element(kind) => {
                let mut s = String::new();
                s.push((b'A' + kind.0.min(25)) as char);
                for _ in 0..tile.ice.unwrap_or(0) {
                    s.push('~');
                }
                s
            }
        },
    }
}
