//! Plain-data copy of a game for renderers and remote observers.

use serde::{Deserialize, Serialize};

use crate::board::Cell;
use crate::goals::Outcome;
use crate::types::{BoosterKind, Coord, GoalKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSnapshot {
    pub kind: GoalKind,
    /// Element name, or `box_full`.
    pub name: String,
    pub target: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoosterSnapshot {
    pub wand: u32,
    pub hammer: u32,
    pub glove: u32,
    pub armed: Option<BoosterKind>,
}

impl BoosterSnapshot {
    pub fn count(&self, kind: BoosterKind) -> u32 {
        match kind {
            BoosterKind::Wand => self.wand,
            BoosterKind::Hammer => self.hammer,
            BoosterKind::Glove => self.glove,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub level_id: u32,
    pub level_name: String,
    /// Increments on every restart.
    pub episode_id: u32,
    pub seed: u64,
    pub cols: u8,
    pub rows: u8,
    /// Row-major.
    pub cells: Vec<Cell>,
    /// Element vocabulary; `ElementKind(i)` is `elements[i]`.
    pub elements: Vec<String>,
    pub moves_left: u32,
    pub score: u32,
    pub goals: Vec<GoalSnapshot>,
    pub boosters: BoosterSnapshot,
    pub selection: Option<Coord>,
    pub outcome: Outcome,
}

impl GameSnapshot {
    pub fn cell(&self, at: Coord) -> Option<Cell> {
        if at.col < 0 || at.row < 0 || at.col as u8 >= self.cols || at.row as u8 >= self.rows {
            return None;
        }
        self.cells
            .get(at.row as usize * self.cols as usize + at.col as usize)
            .copied()
    }

    pub fn playable(&self) -> bool {
        self.outcome == Outcome::InProgress
    }
}
