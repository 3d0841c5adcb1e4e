//! Input/selection state machine.
//!
//! [`decide`] is pure: given the board, the current selection, the cell under
//! pointer-down, the classified gesture and the armed booster, it says what
//! should happen. [`GameState`](crate::GameState) carries the decision out.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::types::{BoosterKind, Coord, ElementKind, Gesture, HelperKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    None,
    Selected(Coord),
}

impl Selection {
    pub fn selected(self) -> Option<Coord> {
        match self {
            Selection::None => None,
            Selection::Selected(c) => Some(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Invalid or locked target; nothing changes.
    Ignore,
    Select(Coord),
    Deselect,
    /// Move the highlight to a different, non-adjacent tile.
    Reselect(Coord),
    Swap { from: Coord, to: Coord },
    ActivateHelper {
        at: Coord,
        reference: Option<ElementKind>,
    },
    UseBooster { booster: BoosterKind, at: Coord },
}

/// Decide what a gesture starting on `at` does.
///
/// - An armed wand or hammer takes the next tap, wherever it lands.
/// - Obstacles, empty cells and holes ignore every other gesture.
/// - A swipe swaps with the neighbor in its direction.
/// - Tapping a helper fires it; a color bomb uses the selected tile's kind.
/// - Otherwise taps select, deselect, swap with an adjacent selection, or
///   move the selection. An armed glove lifts adjacency and makes helpers
///   selectable instead of firing them.
pub fn decide(
    board: &Board,
    selection: Selection,
    at: Coord,
    gesture: Gesture,
    armed: Option<BoosterKind>,
) -> Decision {
    let Some(cell) = board.try_get(at) else {
        return Decision::Ignore;
    };

    if let Some(booster) = armed.filter(|b| b.targets_tile()) {
        return match gesture {
            Gesture::Tap => Decision::UseBooster { booster, at },
            Gesture::Swipe(_) => Decision::Ignore,
        };
    }

    if !cell.is_swappable() {
        return Decision::Ignore;
    }
    let glove = armed == Some(BoosterKind::Glove);

    match gesture {
        Gesture::Swipe(dir) => {
            let to = at.step(dir);
            match board.try_get(to) {
                Some(target) if target.is_swappable() => Decision::Swap { from: at, to },
                _ => Decision::Ignore,
            }
        }
        Gesture::Tap => {
            if let (Some(helper), false) = (cell.helper_kind(), glove) {
                let reference = match helper {
                    HelperKind::ColorBomb => selection
                        .selected()
                        .and_then(|s| board.try_get(s))
                        .and_then(|c| c.matchable_kind()),
                    _ => None,
                };
                return Decision::ActivateHelper { at, reference };
            }

            match selection {
                Selection::None => Decision::Select(at),
                Selection::Selected(s) if s == at => Decision::Deselect,
                Selection::Selected(s) => {
                    let still_valid = board.try_get(s).map(|c| c.is_swappable()).unwrap_or(false);
                    if still_valid && (glove || s.is_adjacent(at)) {
                        Decision::Swap { from: s, to: at }
                    } else {
                        Decision::Reselect(at)
                    }
                }
            }
        }
    }
}
