//! Obstacle damage: ice overlays and boxes.
//!
//! A [`DamageTracker`] lives for one resolution pass. Each coordinate takes at
//! most one point of ice damage and one point of box damage per pass, however
//! many overlapping effects reach it.

use std::collections::HashSet;

use arrayvec::ArrayVec;

use crate::board::{Board, Cell, Tile};
use crate::types::{Coord, ElementKind, HelperKind, ObstacleKind};

/// Result of a single damage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Nothing to damage, or already damaged this pass.
    None,
    /// Strength dropped but the obstacle survives.
    Cracked,
    /// Strength reached zero and the obstacle is gone.
    Destroyed,
}

impl Damage {
    pub fn was_damaged(self) -> bool {
        !matches!(self, Damage::None)
    }
}

/// A recorded obstacle hit, for effect playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleHit {
    pub at: Coord,
    pub obstacle: ObstacleKind,
    pub remaining: u8,
}

/// What a direct hit did to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strike {
    /// Hole or empty cell.
    Nothing,
    /// Ice or box absorbed the hit.
    Obstacle,
    /// An element tile was removed.
    Removed(ElementKind),
    /// A helper sits here; the caller decides whether to chain it.
    Helper(HelperKind),
}

/// Per-pass damage bookkeeping.
#[derive(Debug, Default)]
pub struct DamageTracker {
    ice: HashSet<Coord>,
    boxes: HashSet<Coord>,
    hits: Vec<ObstacleHit>,
    boxes_destroyed: u32,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Damage the ice over the tile at `at`.
    ///
    /// At zero the overlay is dropped and the tile becomes matchable on the
    /// next pass.
    pub fn damage_ice_at(&mut self, board: &mut Board, at: Coord) -> Damage {
        let Some(Cell::Tile(tile)) = board.try_get(at) else {
            return Damage::None;
        };
        let Some(strength) = tile.ice else {
            return Damage::None;
        };
        if !self.ice.insert(at) {
            return Damage::None;
        }

        let remaining = strength.saturating_sub(1);
        let next = Tile {
            ice: (remaining > 0).then_some(remaining),
            ..tile
        };
        board.set(at, Cell::Tile(next));
        self.hits.push(ObstacleHit {
            at,
            obstacle: ObstacleKind::Ice,
            remaining,
        });
        if remaining == 0 {
            Damage::Destroyed
        } else {
            Damage::Cracked
        }
    }

    /// Damage the box at `at`. At zero the cell becomes empty.
    pub fn damage_box_at(&mut self, board: &mut Board, at: Coord) -> Damage {
        let Some(Cell::Box { strength }) = board.try_get(at) else {
            return Damage::None;
        };
        if !self.boxes.insert(at) {
            return Damage::None;
        }

        let remaining = strength.saturating_sub(1);
        if remaining == 0 {
            board.set(at, Cell::Empty);
            self.boxes_destroyed += 1;
        } else {
            board.set(at, Cell::Box { strength: remaining });
        }
        self.hits.push(ObstacleHit {
            at,
            obstacle: ObstacleKind::Box,
            remaining,
        });
        if remaining == 0 {
            Damage::Destroyed
        } else {
            Damage::Cracked
        }
    }

    /// Adjacency damage around a removed tile: ice and boxes on all four sides.
    pub fn splash_around(&mut self, board: &mut Board, at: Coord) -> ArrayVec<Damage, 8> {
        let mut out = ArrayVec::new();
        for n in at.neighbors4() {
            if !board.in_bounds(n) {
                continue;
            }
            let ice = self.damage_ice_at(board, n);
            if ice.was_damaged() {
                out.push(ice);
            }
            let boxed = self.damage_box_at(board, n);
            if boxed.was_damaged() {
                out.push(boxed);
            }
        }
        out
    }

    /// Direct hit from a sweep or booster.
    ///
    /// Obstacles absorb the hit and keep whatever they protect in place.
    /// Element tiles are removed. Helpers are reported, not removed.
    pub fn strike(&mut self, board: &mut Board, at: Coord) -> Strike {
        match board.try_get(at) {
            None | Some(Cell::Hole) | Some(Cell::Empty) => Strike::Nothing,
            Some(Cell::Box { .. }) => {
                self.damage_box_at(board, at);
                Strike::Obstacle
            }
            Some(Cell::Tile(tile)) => {
                if tile.is_frozen() {
                    self.damage_ice_at(board, at);
                    return Strike::Obstacle;
                }
                match tile.helper_kind() {
                    Some(helper) => Strike::Helper(helper),
                    None => match tile.element_kind() {
                        Some(kind) => {
                            board.set(at, Cell::Empty);
                            Strike::Removed(kind)
                        }
                        None => Strike::Nothing,
                    },
                }
            }
        }
    }

    pub fn was_hit(&self, at: Coord) -> bool {
        self.ice.contains(&at) || self.boxes.contains(&at)
    }

    /// Boxes destroyed so far this pass.
    pub fn boxes_destroyed(&self) -> u32 {
        self.boxes_destroyed
    }

    /// Drain recorded hits, oldest first.
    pub fn take_hits(&mut self) -> Vec<ObstacleHit> {
        std::mem::take(&mut self.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_cracks_then_breaks_across_passes() {
        let mut board = Board::from_ascii("[2] A").unwrap();
        let at = Coord::new(0, 0);

        let mut pass = DamageTracker::new();
        assert_eq!(pass.damage_box_at(&mut board, at), Damage::Cracked);
        assert_eq!(board.get(at), Cell::Box { strength: 1 });
        // Same pass: no second hit.
        assert_eq!(pass.damage_box_at(&mut board, at), Damage::None);
        assert_eq!(pass.boxes_destroyed(), 0);

        let mut pass = DamageTracker::new();
        assert_eq!(pass.damage_box_at(&mut board, at), Damage::Destroyed);
        assert_eq!(board.get(at), Cell::Empty);
        assert_eq!(pass.boxes_destroyed(), 1);
    }

    #[test]
    fn test_ice_thaws_to_matchable_tile() {
        let mut board = Board::from_ascii("B~~").unwrap();
        let at = Coord::new(0, 0);

        let mut pass = DamageTracker::new();
        assert_eq!(pass.damage_ice_at(&mut board, at), Damage::Cracked);
        assert_eq!(board.get(at).matchable_kind(), None);

        let mut pass = DamageTracker::new();
        assert_eq!(pass.damage_ice_at(&mut board, at), Damage::Destroyed);
        assert_eq!(board.get(at).matchable_kind(), Some(ElementKind(1)));
        assert!(pass.was_hit(at));
    }

    #[test]
    fn test_damage_on_plain_cells_is_noop() {
        let mut board = Board::from_ascii("A . #").unwrap();
        let mut pass = DamageTracker::new();
        for col in 0..3 {
            let at = Coord::new(col, 0);
            assert!(!pass.damage_ice_at(&mut board, at).was_damaged());
            assert!(!pass.damage_box_at(&mut board, at).was_damaged());
        }
        assert!(pass.take_hits().is_empty());
    }

    #[test]
    fn test_splash_hits_each_neighbor_once() {
        let mut board = Board::from_ascii(". [2] .\nA~ A A~\n. [1] .").unwrap();
        let mut pass = DamageTracker::new();
        let hits = pass.splash_around(&mut board, Coord::new(1, 1));
        assert_eq!(hits.len(), 4);
        assert_eq!(board.get(Coord::new(1, 0)), Cell::Box { strength: 1 });
        assert_eq!(board.get(Coord::new(1, 2)), Cell::Empty);
        assert_eq!(board.get(Coord::new(0, 1)).matchable_kind(), Some(ElementKind(0)));

        // Overlapping splash in the same pass changes nothing.
        let again = pass.splash_around(&mut board, Coord::new(1, 1));
        assert!(again.is_empty());
        assert_eq!(pass.take_hits().len(), 4);
    }

    #[test]
    fn test_strike_keeps_helpers_and_frozen_tiles() {
        let mut board = Board::from_ascii("@ C~ C [1]").unwrap();
        let mut pass = DamageTracker::new();
        assert_eq!(
            pass.strike(&mut board, Coord::new(0, 0)),
            Strike::Helper(HelperKind::ColorBomb)
        );
        assert_eq!(pass.strike(&mut board, Coord::new(1, 0)), Strike::Obstacle);
        assert_eq!(
            pass.strike(&mut board, Coord::new(2, 0)),
            Strike::Removed(ElementKind(2))
        );
        assert_eq!(pass.strike(&mut board, Coord::new(3, 0)), Strike::Obstacle);
        assert_eq!(board.to_ascii(), "@ C . .\n");
    }
}
