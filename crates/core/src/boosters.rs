//! Booster inventory and the wand / hammer board actions.
//!
//! At most one booster is armed at a time. Counts drop only when a booster
//! is actually used; a refused target leaves it armed and untouched.

use serde::{Deserialize, Serialize};

use crate::board::{Cell, Tile};
use crate::cascade::Resolver;
use crate::effects::StateSink;
use crate::goals::Tally;
use crate::helpers::ChainQueue;
use crate::obstacles::{DamageTracker, Strike};
use crate::types::{BoosterKind, Coord, Effect, EffectMode, ObstacleKind, StateChange};

fn slot(kind: BoosterKind) -> usize {
    match kind {
        BoosterKind::Wand => 0,
        BoosterKind::Hammer => 1,
        BoosterKind::Glove => 2,
    }
}

/// Player-owned booster counts plus the currently armed booster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoosterInventory {
    counts: [u32; 3],
    armed: Option<BoosterKind>,
}

impl BoosterInventory {
    pub fn new(wand: u32, hammer: u32, glove: u32) -> Self {
        Self {
            counts: [wand, hammer, glove],
            armed: None,
        }
    }

    pub fn count(&self, kind: BoosterKind) -> u32 {
        self.counts[slot(kind)]
    }

    pub fn armed(&self) -> Option<BoosterKind> {
        self.armed
    }

    /// Arm `kind`, replacing any armed booster. Fails when none are left.
    pub fn arm(&mut self, kind: BoosterKind) -> bool {
        if self.count(kind) == 0 {
            return false;
        }
        self.armed = Some(kind);
        true
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }

    /// Spend one `kind` and disarm it.
    pub fn consume(&mut self, kind: BoosterKind, sink: &mut dyn StateSink) {
        let count = &mut self.counts[slot(kind)];
        *count = count.saturating_sub(1);
        sink.publish(StateChange::BoosterCount {
            booster: kind,
            count: *count,
        });
        if self.armed == Some(kind) {
            self.armed = None;
        }
    }
}

impl Resolver<'_> {
    /// Clear the single obstacle or element tile at `at`.
    ///
    /// A box is removed outright and credits the box goal. On a frozen tile
    /// only the ice breaks: the element stays put and credits nothing. A free
    /// element tile is removed and credited. Helpers, holes and empty cells
    /// are refused.
    pub fn apply_wand(&mut self, at: Coord) -> bool {
        let Some(cell) = self.board.try_get(at) else {
            return false;
        };
        let mut tally = Tally::default();
        let mut removed = Vec::new();
        let (next, broken) = match cell {
            Cell::Box { .. } => {
                tally.boxes_cleared = 1;
                (Cell::Empty, Some(ObstacleKind::Box))
            }
            Cell::Tile(tile) if tile.is_frozen() => (
                Cell::Tile(Tile { ice: None, ..tile }),
                Some(ObstacleKind::Ice),
            ),
            Cell::Tile(tile) => match tile.element_kind() {
                Some(kind) => {
                    removed.push((at, kind));
                    (Cell::Empty, None)
                }
                None => return false,
            },
            Cell::Hole | Cell::Empty => return false,
        };

        self.effects.play(
            &Effect::BoosterCast {
                booster: BoosterKind::Wand,
                at,
            },
            EffectMode::Wait,
        );
        if let Some(obstacle) = broken {
            self.effects.play(
                &Effect::ObstacleDamaged {
                    at,
                    obstacle,
                    remaining: 0,
                },
                EffectMode::FireAndForget,
            );
        }
        self.board.set(at, next);
        self.finish_strike(DamageTracker::new(), removed, tally);
        true
    }

    /// Hit the full row and column through `at`.
    ///
    /// Obstacles take one point of damage, element tiles are removed and
    /// helpers are queued for activation. The hammer itself costs no move.
    pub fn apply_hammer(&mut self, at: Coord, queue: &mut ChainQueue) -> bool {
        match self.board.try_get(at) {
            None | Some(Cell::Hole) => return false,
            Some(_) => {}
        }

        self.effects.play(
            &Effect::BoosterCast {
                booster: BoosterKind::Hammer,
                at,
            },
            EffectMode::Wait,
        );

        let mut targets: Vec<Coord> = (0..self.board.cols() as i8)
            .map(|col| Coord::new(col, at.row))
            .collect();
        targets.extend(
            (0..self.board.rows() as i8)
                .map(|row| Coord::new(at.col, row))
                .filter(|c| *c != at),
        );

        let mut tracker = DamageTracker::new();
        let mut removed = Vec::new();
        for target in targets {
            match tracker.strike(self.board, target) {
                Strike::Removed(kind) => removed.push((target, kind)),
                Strike::Helper(_) => queue.push(target, None),
                Strike::Nothing | Strike::Obstacle => {}
            }
        }
        self.finish_strike(tracker, removed, Tally::default());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::effects::{InstantEffects, NullSink, RecordingSink};
    use crate::goals::{Goal, Goals, Progress};
    use crate::rng::SequenceRng;
    use crate::types::{ElementKind, GoalKind};

    #[test]
    fn test_arming_is_exclusive() {
        let mut inv = BoosterInventory::new(1, 1, 0);
        assert!(inv.arm(BoosterKind::Wand));
        assert!(inv.arm(BoosterKind::Hammer));
        assert_eq!(inv.armed(), Some(BoosterKind::Hammer));
        assert!(!inv.arm(BoosterKind::Glove));
        assert_eq!(inv.armed(), Some(BoosterKind::Hammer));
    }

    #[test]
    fn test_consume_publishes_count_and_disarms() {
        let (mut sink, log) = RecordingSink::new();
        let mut inv = BoosterInventory::new(2, 0, 0);
        inv.arm(BoosterKind::Wand);
        inv.consume(BoosterKind::Wand, &mut sink);
        assert_eq!(inv.count(BoosterKind::Wand), 1);
        assert_eq!(inv.armed(), None);
        assert_eq!(
            log.borrow().as_slice(),
            &[StateChange::BoosterCount {
                booster: BoosterKind::Wand,
                count: 1
            }]
        );
    }

    fn with_resolver<R>(board: &mut Board, f: impl FnOnce(&mut Resolver<'_>) -> R) -> (R, Progress) {
        let mut progress = Progress::new(
            Goals::new(vec![
                Goal::new(GoalKind::Element(ElementKind(0)), 5),
                Goal::new(GoalKind::BoxCleared, 2),
            ]),
            10,
        );
        let mut rng = SequenceRng::new(vec![0]);
        let mut fx = InstantEffects;
        let mut sink = NullSink;
        let out = {
            let mut r = Resolver {
                board,
                vocabulary: 3,
                rng: &mut rng,
                effects: &mut fx,
                progress: &mut progress,
                sink: &mut sink,
            };
            f(&mut r)
        };
        (out, progress)
    }

    #[test]
    fn test_wand_removes_box_outright() {
        let mut board = Board::from_ascii("[2] A").unwrap();
        let (ok, progress) = with_resolver(&mut board, |r| r.apply_wand(Coord::new(0, 0)));
        assert!(ok);
        assert_eq!(board.get(Coord::new(0, 0)), Cell::Empty);
        assert_eq!(progress.goals().remaining(GoalKind::BoxCleared), Some(1));
    }

    #[test]
    fn test_wand_only_breaks_ice_on_a_frozen_tile() {
        let mut board = Board::from_ascii("A~~ B").unwrap();
        let (ok, progress) = with_resolver(&mut board, |r| r.apply_wand(Coord::new(0, 0)));
        assert!(ok);
        assert_eq!(board.to_ascii(), "A B\n");
        assert_eq!(
            progress.goals().remaining(GoalKind::Element(ElementKind(0))),
            Some(5)
        );
    }

    #[test]
    fn test_wand_removes_free_tile_and_credits_it() {
        let mut board = Board::from_ascii("A B").unwrap();
        let (ok, progress) = with_resolver(&mut board, |r| r.apply_wand(Coord::new(0, 0)));
        assert!(ok);
        assert_eq!(board.get(Coord::new(0, 0)), Cell::Empty);
        assert_eq!(
            progress.goals().remaining(GoalKind::Element(ElementKind(0))),
            Some(4)
        );
    }

    #[test]
    fn test_wand_refuses_helpers_and_empty_cells() {
        let mut board = Board::from_ascii("@ . #").unwrap();
        for col in 0..3 {
            let (ok, _) = with_resolver(&mut board, |r| r.apply_wand(Coord::new(col, 0)));
            assert!(!ok);
        }
        assert_eq!(board.to_ascii(), "@ . #\n");
    }

    #[test]
    fn test_hammer_hits_row_and_column() {
        let mut board = Board::from_ascii("B A C\nA~ A [2]\nC - B").unwrap();
        let mut queue = ChainQueue::new();
        let (ok, progress) = with_resolver(&mut board, |r| r.apply_hammer(Coord::new(1, 1), &mut queue));
        assert!(ok);
        assert_eq!(board.to_ascii(), "B . C\nA . [1]\nC - B\n");
        assert_eq!(queue.pop().map(|a| a.at), Some(Coord::new(1, 2)));
        assert_eq!(
            progress.goals().remaining(GoalKind::Element(ElementKind(0))),
            Some(3)
        );
        // The hammer itself is free.
        assert_eq!(progress.moves_left(), 10);
    }
}
