//! Goals, move budget, score and the win/loss decision.
//!
//! Goals count down from their target and clamp at zero. The move budget
//! saturates at zero. Once an outcome is decided it never changes.

use serde::{Deserialize, Serialize};

use crate::effects::{EffectPlayer, StateSink};
use crate::types::{
    Effect, EffectMode, ElementKind, GoalKind, StateChange, BONUS_PER_MOVE, SCORE_PER_TILE,
};

/// Everything one pass or activation cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    /// One entry per removed element tile.
    pub removed: Vec<ElementKind>,
    pub boxes_cleared: u32,
    /// Helper activations that cost a move unless moves are free.
    pub activations: u32,
}

impl Tally {
    pub fn count(&self, kind: ElementKind) -> u32 {
        self.removed.iter().filter(|k| **k == kind).count() as u32
    }

    pub fn merge(&mut self, other: Tally) {
        self.removed.extend(other.removed);
        self.boxes_cleared += other.boxes_cleared;
        self.activations += other.activations;
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.boxes_cleared == 0 && self.activations == 0
    }

    fn credit_for(&self, goal: GoalKind) -> u32 {
        match goal {
            GoalKind::Element(kind) => self.count(kind),
            GoalKind::BoxCleared => self.boxes_cleared,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub kind: GoalKind,
    pub target: u32,
    pub remaining: u32,
}

impl Goal {
    pub fn new(kind: GoalKind, target: u32) -> Self {
        Self {
            kind,
            target,
            remaining: target,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// The level's goal list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Goals {
    entries: Vec<Goal>,
}

impl Goals {
    pub fn new(entries: Vec<Goal>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.entries.iter()
    }

    pub fn get(&self, kind: GoalKind) -> Option<&Goal> {
        self.entries.iter().find(|g| g.kind == kind)
    }

    pub fn remaining(&self, kind: GoalKind) -> Option<u32> {
        self.get(kind).map(|g| g.remaining)
    }

    pub fn all_complete(&self) -> bool {
        self.entries.iter().all(Goal::is_complete)
    }

    /// Count down `n` clears of `kind`. Returns the new remaining value when
    /// it changed.
    pub fn credit(&mut self, kind: GoalKind, n: u32) -> Option<u32> {
        let goal = self.entries.iter_mut().find(|g| g.kind == kind)?;
        if n == 0 || goal.remaining == 0 {
            return None;
        }
        goal.remaining = goal.remaining.saturating_sub(n);
        Some(goal.remaining)
    }
}

/// Remaining moves. Never goes below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveBudget {
    left: u32,
}

impl MoveBudget {
    pub fn new(left: u32) -> Self {
        Self { left }
    }

    pub fn left(&self) -> u32 {
        self.left
    }

    pub fn is_exhausted(&self) -> bool {
        self.left == 0
    }

    /// Spend up to `n` moves; returns how many were actually spent.
    pub fn spend(&mut self, n: u32) -> u32 {
        let spent = n.min(self.left);
        self.left -= spent;
        spent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

/// Level bookkeeping owned by the game state and fed by the cascade.
#[derive(Debug, Clone)]
pub struct Progress {
    goals: Goals,
    moves: MoveBudget,
    score: u32,
    /// Element tiles removed so far, bonus excluded.
    cleared: u32,
    outcome: Outcome,
    free_moves: bool,
}

impl Progress {
    pub fn new(goals: Goals, moves: u32) -> Self {
        Self {
            goals,
            moves: MoveBudget::new(moves),
            score: 0,
            cleared: 0,
            outcome: Outcome::InProgress,
            free_moves: false,
        }
    }

    pub fn goals(&self) -> &Goals {
        &self.goals
    }

    pub fn moves_left(&self) -> u32 {
        self.moves.left()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tiles_cleared(&self) -> u32 {
        self.cleared
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    /// While set, neither swaps nor helper activations cost moves.
    pub fn set_free_moves(&mut self, free: bool) {
        self.free_moves = free;
    }

    pub fn free_moves(&self) -> bool {
        self.free_moves
    }

    /// Charge one move for a committed action. Returns whether a move was spent.
    pub fn spend_move(&mut self, sink: &mut dyn StateSink) -> bool {
        self.charge(1, sink) > 0
    }

    fn charge(&mut self, n: u32, sink: &mut dyn StateSink) -> u32 {
        if self.free_moves || self.is_over() || n == 0 {
            return 0;
        }
        let spent = self.moves.spend(n);
        if spent > 0 {
            sink.publish(StateChange::MovesChanged {
                moves_left: self.moves.left(),
            });
        }
        spent
    }

    /// Credit goals and score for `tally` and charge its helper activations.
    pub fn record(&mut self, tally: &Tally, sink: &mut dyn StateSink) {
        if self.is_over() {
            return;
        }

        let kinds: Vec<GoalKind> = self.goals.iter().map(|g| g.kind).collect();
        for kind in kinds {
            let n = tally.credit_for(kind);
            if let Some(remaining) = self.goals.credit(kind, n) {
                sink.publish(StateChange::GoalProgress {
                    goal: kind,
                    remaining,
                });
            }
        }

        if !tally.removed.is_empty() {
            self.cleared += tally.removed.len() as u32;
            self.score += tally.removed.len() as u32 * SCORE_PER_TILE;
            sink.publish(StateChange::ScoreChanged { score: self.score });
        }

        self.charge(tally.activations, sink);
    }

    /// Decide the outcome once the cascade has settled.
    ///
    /// Completed goals win; leftover moves are converted to bonus score one
    /// at a time first. Exhausted moves with open goals lose.
    pub fn settle(&mut self, sink: &mut dyn StateSink, effects: &mut dyn EffectPlayer) -> Outcome {
        if self.is_over() {
            return self.outcome;
        }

        if self.goals.all_complete() {
            while self.moves.spend(1) == 1 {
                self.score += BONUS_PER_MOVE;
                effects.play(
                    &Effect::MoveBonus {
                        moves_left: self.moves.left(),
                    },
                    EffectMode::Wait,
                );
                sink.publish(StateChange::MovesChanged {
                    moves_left: self.moves.left(),
                });
                sink.publish(StateChange::ScoreChanged { score: self.score });
            }
            self.outcome = Outcome::Won;
            sink.publish(StateChange::LevelWon);
        } else if self.moves.is_exhausted() {
            self.outcome = Outcome::Lost;
            sink.publish(StateChange::LevelLost);
        }
        self.outcome
    }
}
