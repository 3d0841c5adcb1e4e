//! Core types module - shared data structures and constants
//!
//! This module defines the plain data passed between the engine, the input layer,
//! the terminal view and the AI adapter. Nothing here owns a board or mutates
//! game state; every type is `Copy` where it can be and serializes to the
//! snake_case JSON used by the adapter protocol.
//!
//! # Coordinates
//!
//! Grid positions are `(col, row)` pairs, 0-indexed from the top-left corner.
//! Rows grow downward, so gravity moves tiles toward larger `row` values.
//!
//! # Tuning Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TAP_THRESHOLD_PX` | 10.0 | Max pointer travel still classified as a tap |
//! | `SCORE_PER_TILE` | 1 | Score awarded per removed element tile |
//! | `BONUS_PER_MOVE` | 5 | Score awarded per unused move after a win |
//! | `MAX_CASCADE_ITERATIONS` | 256 | Resolution passes before a level is declared broken |
//! | `MAX_RESHUFFLES` | 64 | Reshuffle attempts before a level is declared broken |
//!
//! # Examples
//!
//! ```
//! use tile_match_types::{BoosterKind, Coord, Direction, HelperKind};
//!
//! let c = Coord::new(3, 4);
//! assert_eq!(c.step(Direction::Up), Coord::new(3, 3));
//! assert!(c.is_adjacent(Coord::new(4, 4)));
//! assert_eq!(c.neighbors4().len(), 4);
//!
//! assert_eq!(BoosterKind::from_str("hammer"), Some(BoosterKind::Hammer));
//! assert_eq!(HelperKind::LineHorizontal.axis(), Some(tile_match_types::Axis::Horizontal));
//! ```

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Maximum pointer travel (in pixels) for a gesture to count as a tap.
pub const TAP_THRESHOLD_PX: f32 = 10.0;

/// Score per element tile removed by a match, sweep, bomb or booster.
pub const SCORE_PER_TILE: u32 = 1;

/// Score per unused move converted after all goals are met.
pub const BONUS_PER_MOVE: u32 = 5;

/// Upper bound on Resolving passes triggered by a single action.
pub const MAX_CASCADE_ITERATIONS: u32 = 256;

/// Upper bound on consecutive reshuffles before giving up on a layout.
pub const MAX_RESHUFFLES: u32 = 64;

/// Largest board edge accepted by level loading.
pub const MAX_BOARD_EDGE: u8 = 16;

/// Grid position, `(col, row)` from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub col: i8,
    pub row: i8,
}

impl Coord {
    pub const fn new(col: i8, row: i8) -> Self {
        Self { col, row }
    }

    pub fn offset(self, dc: i8, dr: i8) -> Self {
        Self::new(self.col + dc, self.row + dr)
    }

    /// The neighboring coordinate one cell toward `dir`.
    pub fn step(self, dir: Direction) -> Self {
        let (dc, dr) = dir.delta();
        self.offset(dc, dr)
    }

    /// Orthogonal neighbors in left, right, up, down order.
    ///
    /// Bounds are not checked; callers filter against the board.
    pub fn neighbors4(self) -> ArrayVec<Coord, 4> {
        let mut out = ArrayVec::new();
        out.push(self.offset(-1, 0));
        out.push(self.offset(1, 0));
        out.push(self.offset(0, -1));
        out.push(self.offset(0, 1));
        out
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        let dc = (self.col - other.col).abs();
        let dr = (self.row - other.row).abs();
        dc + dr == 1
    }
}

/// Index into a level's element vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementKind(pub u8);

impl ElementKind {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Line axis of a match group or a line sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn perpendicular(self) -> Self {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Special tiles produced by long matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperKind {
    /// Clears its whole row.
    LineHorizontal,
    /// Clears its whole column.
    LineVertical,
    /// Clears every tile of one element kind.
    ColorBomb,
}

impl HelperKind {
    /// Line helper sweeping along `axis`.
    pub fn line(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => HelperKind::LineHorizontal,
            Axis::Vertical => HelperKind::LineVertical,
        }
    }

    /// Sweep axis, `None` for the color bomb.
    pub fn axis(self) -> Option<Axis> {
        match self {
            HelperKind::LineHorizontal => Some(Axis::Horizontal),
            HelperKind::LineVertical => Some(Axis::Vertical),
            HelperKind::ColorBomb => None,
        }
    }

    pub fn is_line(self) -> bool {
        self.axis().is_some()
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "horizontal" | "horizontalhelper" | "line_horizontal" => {
                Some(HelperKind::LineHorizontal)
            }
            "vertical" | "verticalhelper" | "line_vertical" => Some(HelperKind::LineVertical),
            "color_bomb" | "colorbomb" | "discoball" | "bomb" => Some(HelperKind::ColorBomb),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HelperKind::LineHorizontal => "line_horizontal",
            HelperKind::LineVertical => "line_vertical",
            HelperKind::ColorBomb => "color_bomb",
        }
    }
}

/// Grid-axis direction of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `(dcol, drow)` step for this direction.
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// A committed pointer gesture, already classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    Tap,
    Swipe(Direction),
}

/// Consumable boosters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoosterKind {
    /// Removes exactly one targeted obstacle or tile.
    Wand,
    /// Hits the full row and column of the target.
    Hammer,
    /// Next swap is free, unrestricted and always commits.
    Glove,
}

impl BoosterKind {
    pub const ALL: [BoosterKind; 3] = [BoosterKind::Wand, BoosterKind::Hammer, BoosterKind::Glove];

    /// Whether this booster is applied by tapping a target cell.
    pub fn targets_tile(self) -> bool {
        matches!(self, BoosterKind::Wand | BoosterKind::Hammer)
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "wand" | "booster_wand" => Some(BoosterKind::Wand),
            "hammer" | "booster_hammer" => Some(BoosterKind::Hammer),
            "glove" | "booster_glove" => Some(BoosterKind::Glove),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoosterKind::Wand => "wand",
            BoosterKind::Hammer => "hammer",
            BoosterKind::Glove => "glove",
        }
    }
}

/// What a level goal counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Element(ElementKind),
    /// Destroyed boxes (`box_full` in level files).
    BoxCleared,
}

/// Obstacle overlay kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Ice,
    Box,
}

/// How the engine waits on a visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMode {
    /// The engine does not continue until the player returns.
    Wait,
    /// Presentation only; may overlap with later effects.
    FireAndForget,
}

/// Logical events handed to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Swap { a: Coord, b: Coord },
    SwapBack { a: Coord, b: Coord },
    Remove { at: Coord, kind: ElementKind },
    ObstacleDamaged { at: Coord, obstacle: ObstacleKind, remaining: u8 },
    HelperSpawn { at: Coord, helper: HelperKind },
    HelperFlash { at: Coord, helper: HelperKind },
    Sweep { origin: Coord, axis: Axis },
    Drop { from: Coord, to: Coord },
    Spawn { at: Coord, kind: ElementKind },
    BoosterCast { booster: BoosterKind, at: Coord },
    Reshuffle,
    MoveBonus { moves_left: u32 },
}

/// State changes pushed to the host after each bookkeeping step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StateChange {
    MovesChanged { moves_left: u32 },
    GoalProgress { goal: GoalKind, remaining: u32 },
    ScoreChanged { score: u32 },
    BoosterCount { booster: BoosterKind, count: u32 },
    LevelWon,
    LevelLost,
}
