//! Helper tiles: spawn rules, line sweeps, color bombs and chain activation.
//!
//! Activations never recurse. A sweep that reaches another helper pushes it
//! onto a [`ChainQueue`]; the queue is drained only after the current sweep
//! finishes, and its visited set keeps a helper from firing twice in one chain.

use std::collections::{HashSet, VecDeque};

use crate::board::{Board, Cell};
use crate::matcher::MatchGroup;
use crate::obstacles::{DamageTracker, Strike};
use crate::rng::TileRng;
use crate::types::{Axis, Coord, ElementKind, HelperKind};

/// Helper earned by a match group, if any, and where it appears.
///
/// Runs of 4 earn a line helper clearing across the run; runs of 5 or more
/// earn a color bomb. The helper lands on the first swapped cell the group
/// contains, otherwise on the group's middle cell (`len / 2`).
pub fn spawn_for(group: &MatchGroup, swapped: &[Coord]) -> Option<(Coord, HelperKind)> {
    let helper = match group.len() {
        0..=3 => return None,
        4 => HelperKind::line(group.axis.perpendicular()),
        _ => HelperKind::ColorBomb,
    };
    let at = group
        .cells
        .iter()
        .copied()
        .find(|c| swapped.contains(c))
        .unwrap_or(group.cells[group.len() / 2]);
    Some((at, helper))
}

/// A pending helper activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub at: Coord,
    /// Kind a color bomb should clear; picked at activation time when `None`.
    pub reference: Option<ElementKind>,
}

/// Work queue of helper activations plus the chain's visited set.
#[derive(Debug, Default)]
pub struct ChainQueue {
    pending: VecDeque<Activation>,
    visited: HashSet<Coord>,
}

impl ChainQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at: Coord, reference: Option<ElementKind>) {
        if !self.visited.contains(&at) {
            self.pending.push_back(Activation { at, reference });
        }
    }

    /// Next activation not yet visited in this chain.
    pub fn pop(&mut self) -> Option<Activation> {
        while let Some(next) = self.pending.pop_front() {
            if self.visited.insert(next.at) {
                return Some(next);
            }
        }
        None
    }

    pub fn is_visited(&self, at: Coord) -> bool {
        self.visited.contains(&at)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Cells reached by a sweep from `origin`, nearest first, alternating between
/// the two fronts.
pub fn sweep_order(board: &Board, origin: Coord, axis: Axis) -> Vec<Coord> {
    let (dc, dr) = match axis {
        Axis::Horizontal => (1, 0),
        Axis::Vertical => (0, 1),
    };
    let reach = board.cols().max(board.rows()) as i8;
    let mut out = Vec::new();
    for d in 1..=reach {
        let back = origin.offset(-dc * d, -dr * d);
        let fwd = origin.offset(dc * d, dr * d);
        if board.in_bounds(back) {
            out.push(back);
        }
        if board.in_bounds(fwd) {
            out.push(fwd);
        }
    }
    out
}

/// Sweep a line from `origin`. The helper's own cell must already be cleared.
///
/// Obstacles take one point of damage and keep their cell; the sweep carries
/// on past them. Helpers are queued for chain activation.
pub fn fire_line(
    board: &mut Board,
    tracker: &mut DamageTracker,
    origin: Coord,
    axis: Axis,
    queue: &mut ChainQueue,
) -> Vec<(Coord, ElementKind)> {
    let mut removed = Vec::new();
    for at in sweep_order(board, origin, axis) {
        match tracker.strike(board, at) {
            Strike::Removed(kind) => removed.push((at, kind)),
            Strike::Helper(_) => queue.push(at, None),
            Strike::Nothing | Strike::Obstacle => {}
        }
    }
    removed
}

/// Pick the kind a color bomb at `at` clears when nothing was swapped into it.
///
/// Prefers a random free orthogonal neighbor, then any free element tile on
/// the board. `None` when the board has no free element tile at all.
pub fn bomb_reference(board: &Board, at: Coord, rng: &mut dyn TileRng) -> Option<ElementKind> {
    let near: Vec<ElementKind> = board
        .neighbors(at)
        .filter_map(|n| board.get(n).matchable_kind())
        .collect();
    if !near.is_empty() {
        return Some(near[rng.pick(near.len())]);
    }

    let anywhere: Vec<ElementKind> = board
        .coords()
        .filter_map(|c| board.get(c).matchable_kind())
        .collect();
    if anywhere.is_empty() {
        return None;
    }
    Some(anywhere[rng.pick(anywhere.len())])
}

/// Clear every tile of `kind`.
///
/// Targets are fixed before any damage lands. Frozen targets lose one point
/// of ice instead of being removed; free targets splash their neighbors like
/// a normal match and are removed.
pub fn fire_bomb(
    board: &mut Board,
    tracker: &mut DamageTracker,
    kind: ElementKind,
) -> Vec<(Coord, ElementKind)> {
    let targets: Vec<(Coord, bool)> = board
        .coords()
        .filter_map(|c| match board.get(c) {
            Cell::Tile(t) if t.element_kind() == Some(kind) => Some((c, t.is_frozen())),
            _ => None,
        })
        .collect();

    let mut removed = Vec::new();
    for (at, frozen) in targets {
        if frozen {
            tracker.damage_ice_at(board, at);
            continue;
        }
        tracker.splash_around(board, at);
        if board.get(at).matchable_kind() == Some(kind) {
            board.set(at, Cell::Empty);
            removed.push((at, kind));
        }
    }
    removed
}

/// Two color bombs together: wipe every unprotected tile, helpers included.
///
/// Ice-covered tiles and boxes are left alone.
pub fn clear_board(board: &mut Board) -> Vec<(Coord, ElementKind)> {
    let mut removed = Vec::new();
    let all: Vec<Coord> = board.coords().collect();
    for at in all {
        if let Cell::Tile(tile) = board.get(at) {
            if tile.is_frozen() {
                continue;
            }
            board.set(at, Cell::Empty);
            if let Some(kind) = tile.element_kind() {
                removed.push((at, kind));
            }
        }
    }
    removed
}

/// Every helper of `kind` on the board, row-major.
pub fn helpers_of(board: &Board, kind: HelperKind) -> Vec<Coord> {
    board
        .coords()
        .filter(|c| board.get(*c).helper_kind() == Some(kind))
        .collect()
}

/// How a committed swap involving helpers resolves. Coordinates are the
/// tiles' positions after the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapKind {
    /// Two element tiles.
    Basic,
    /// One helper and one element tile.
    Helper { helper: Coord, partner: Coord },
    /// Two line helpers fire together.
    LinePair { a: Coord, b: Coord },
    /// Color bomb plus line helper: every helper of that line kind fires.
    BombWithLine { bomb: Coord, line: HelperKind },
    /// Two color bombs clear the board.
    BombPair { a: Coord, b: Coord },
}

pub fn classify_swap(board: &Board, a: Coord, b: Coord) -> SwapKind {
    match (board.get(a).helper_kind(), board.get(b).helper_kind()) {
        (None, None) => SwapKind::Basic,
        (Some(_), None) => SwapKind::Helper {
            helper: a,
            partner: b,
        },
        (None, Some(_)) => SwapKind::Helper {
            helper: b,
            partner: a,
        },
        (Some(HelperKind::ColorBomb), Some(HelperKind::ColorBomb)) => SwapKind::BombPair { a, b },
        (Some(HelperKind::ColorBomb), Some(line)) => SwapKind::BombWithLine { bomb: a, line },
        (Some(line), Some(HelperKind::ColorBomb)) => SwapKind::BombWithLine { bomb: b, line },
        (Some(_), Some(_)) => SwapKind::LinePair { a, b },
    }
}
