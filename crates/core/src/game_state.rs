//! Game state: owns the board, bookkeeping and collaborators, and turns
//! pointer gestures into resolved board changes.
//!
//! Every public action runs to completion before returning. Input that
//! arrives while a resolution is in flight is ignored.

use tracing::{debug, info, instrument};

use crate::board::{Board, Cell};
use crate::boosters::BoosterInventory;
use crate::cascade::Resolver;
use crate::effects::{EffectPlayer, InstantEffects, NullSink, StateSink};
use crate::error::{EngineError, LevelError};
use crate::goals::{Goals, Outcome, Progress, Tally};
use crate::helpers::{classify_swap, clear_board, helpers_of, ChainQueue, SwapKind};
use crate::level::LevelDefinition;
use crate::matcher::has_match;
use crate::obstacles::DamageTracker;
use crate::rng::{SeededRng, TileRng};
use crate::selection::{decide, Decision, Selection};
use crate::snapshot::{BoosterSnapshot, GameSnapshot, GoalSnapshot};
use crate::types::{
    BoosterKind, Coord, Effect, EffectMode, ElementKind, Gesture, HelperKind, StateChange,
};

/// What a pointer gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Invalid or locked target; nothing changed.
    Ignored,
    Selected(Coord),
    Deselected,
    /// A basic swap with no match was undone. No move was spent.
    Reverted,
    /// The board changed and the cascade settled.
    Resolved {
        /// Moves charged by the action itself, bonus conversion excluded.
        moves_spent: u32,
        /// Element tiles removed, cascades included.
        removed: u32,
    },
}

pub struct GameState {
    level: LevelDefinition,
    seed: u64,
    episode_id: u32,
    board: Board,
    rng: Box<dyn TileRng>,
    effects: Box<dyn EffectPlayer>,
    sink: Box<dyn StateSink>,
    progress: Progress,
    boosters: BoosterInventory,
    selection: Selection,
    processing: bool,
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("level", &self.level.id)
            .field("seed", &self.seed)
            .field("episode_id", &self.episode_id)
            .field("progress", &self.progress)
            .field("boosters", &self.boosters)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Build a level from its definition. The starting board has no ready-made
    /// match, offers at least one legal swap, and no cascade is run.
    pub fn new(level: LevelDefinition, seed: u64) -> Result<Self, LevelError> {
        level.validate()?;
        let mut rng = SeededRng::new(seed);
        let board = level.build_playable_board(&mut rng)?;
        Self::assemble(level, seed, board, Box::new(rng))
    }

    /// Play `level`'s rules on a hand-built board with a scripted RNG.
    pub fn with_board(
        level: LevelDefinition,
        board: Board,
        rng: Box<dyn TileRng>,
    ) -> Result<Self, LevelError> {
        level.validate()?;
        if (board.cols(), board.rows()) != (level.cols, level.rows) {
            return Err(LevelError::BoardShape {
                cols: board.cols(),
                rows: board.rows(),
                expected_cols: level.cols,
                expected_rows: level.rows,
            });
        }
        Self::assemble(level, 0, board, rng)
    }

    fn assemble(
        level: LevelDefinition,
        seed: u64,
        board: Board,
        rng: Box<dyn TileRng>,
    ) -> Result<Self, LevelError> {
        let progress = Progress::new(level.goal_list()?, level.moves);
        Ok(Self {
            level,
            seed,
            episode_id: 0,
            board,
            rng,
            effects: Box::new(InstantEffects),
            sink: Box::new(NullSink),
            progress,
            boosters: BoosterInventory::default(),
            selection: Selection::None,
            processing: false,
        })
    }

    pub fn with_effects(mut self, effects: impl EffectPlayer + 'static) -> Self {
        self.effects = Box::new(effects);
        self
    }

    pub fn with_sink(mut self, sink: impl StateSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_boosters(mut self, boosters: BoosterInventory) -> Self {
        self.boosters = boosters;
        self
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves_left(&self) -> u32 {
        self.progress.moves_left()
    }

    pub fn score(&self) -> u32 {
        self.progress.score()
    }

    pub fn goals(&self) -> &Goals {
        self.progress.goals()
    }

    pub fn outcome(&self) -> Outcome {
        self.progress.outcome()
    }

    pub fn boosters(&self) -> &BoosterInventory {
        &self.boosters
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    /// Arm `kind`, replacing any armed booster. False when none are owned or
    /// the level is over.
    pub fn arm_booster(&mut self, kind: BoosterKind) -> bool {
        if self.progress.is_over() {
            return false;
        }
        self.boosters.arm(kind)
    }

    pub fn disarm_booster(&mut self) {
        self.boosters.disarm();
    }

    /// Handle one committed gesture that started on `at`.
    ///
    /// Errors only for unreachable configurations (a cascade or reshuffle
    /// that never settles); invalid actions come back as `Ignored`.
    #[instrument(level = "debug", skip(self), fields(episode = self.episode_id))]
    pub fn pointer(&mut self, at: Coord, gesture: Gesture) -> Result<ActionOutcome, EngineError> {
        if self.progress.is_over() || self.processing || !self.board.in_bounds(at) {
            return Ok(ActionOutcome::Ignored);
        }

        let decision = decide(&self.board, self.selection, at, gesture, self.boosters.armed());
        debug!(?decision, "pointer decision");
        match decision {
            Decision::Ignore => Ok(ActionOutcome::Ignored),
            Decision::Select(c) | Decision::Reselect(c) => {
                self.selection = Selection::Selected(c);
                Ok(ActionOutcome::Selected(c))
            }
            Decision::Deselect => {
                self.selection = Selection::None;
                Ok(ActionOutcome::Deselected)
            }
            Decision::Swap { from, to } => self.swap(from, to),
            Decision::ActivateHelper { at, reference } => {
                self.selection = Selection::None;
                self.activate_helper(at, reference)
            }
            Decision::UseBooster { booster, at } => self.use_booster(booster, at),
        }
    }

    /// Swap two tiles directly, with the rules a select-then-tap pair obeys:
    /// both must be free tiles, adjacent unless the glove is armed. An armed
    /// wand or hammer blocks swapping.
    pub fn swap_tiles(&mut self, from: Coord, to: Coord) -> Result<ActionOutcome, EngineError> {
        if self.progress.is_over() || self.processing || from == to {
            return Ok(ActionOutcome::Ignored);
        }
        let armed = self.boosters.armed();
        if armed.is_some_and(BoosterKind::targets_tile) {
            return Ok(ActionOutcome::Ignored);
        }
        let free = |at: Coord| self.board.try_get(at).is_some_and(|c| c.is_swappable());
        if !free(from) || !free(to) {
            return Ok(ActionOutcome::Ignored);
        }
        if armed != Some(BoosterKind::Glove) && !from.is_adjacent(to) {
            return Ok(ActionOutcome::Ignored);
        }
        self.swap(from, to)
    }

    fn swap(&mut self, from: Coord, to: Coord) -> Result<ActionOutcome, EngineError> {
        let glove = self.boosters.armed() == Some(BoosterKind::Glove);
        self.selection = Selection::None;

        self.effects
            .play(&Effect::Swap { a: from, b: to }, EffectMode::Wait);
        self.board.swap(from, to);

        let kind = classify_swap(&self.board, to, from);
        if kind == SwapKind::Basic && !glove && !has_match(&self.board) {
            self.board.swap(from, to);
            self.effects
                .play(&Effect::SwapBack { a: from, b: to }, EffectMode::Wait);
            debug!(?from, ?to, "swap reverted");
            return Ok(ActionOutcome::Reverted);
        }

        if glove {
            self.boosters.consume(BoosterKind::Glove, self.sink.as_mut());
        }

        let outcome = self.resolve(glove, |r| {
            match kind {
                SwapKind::Basic => {
                    r.progress.spend_move(r.sink);
                    return Some(vec![from, to]);
                }
                SwapKind::Helper { helper, partner } => {
                    let reference = r.board.get(partner).matchable_kind();
                    let mut queue = ChainQueue::new();
                    queue.push(helper, reference);
                    r.run_chain(&mut queue);
                }
                SwapKind::LinePair { a, b } => {
                    let mut queue = ChainQueue::new();
                    queue.push(a, None);
                    queue.push(b, None);
                    r.run_chain(&mut queue);
                }
                SwapKind::BombWithLine { bomb, line } => bomb_with_line(r, bomb, line),
                SwapKind::BombPair { a, b } => bomb_pair(r, a, b),
            }
            Some(Vec::new())
        })?;
        Ok(outcome.unwrap_or(ActionOutcome::Ignored))
    }

    fn activate_helper(
        &mut self,
        at: Coord,
        reference: Option<ElementKind>,
    ) -> Result<ActionOutcome, EngineError> {
        let outcome = self.resolve(false, |r| {
            let mut queue = ChainQueue::new();
            queue.push(at, reference);
            r.run_chain(&mut queue);
            Some(Vec::new())
        })?;
        Ok(outcome.unwrap_or(ActionOutcome::Ignored))
    }

    fn use_booster(&mut self, booster: BoosterKind, at: Coord) -> Result<ActionOutcome, EngineError> {
        let outcome = self.resolve(false, |r| match booster {
            BoosterKind::Wand => r.apply_wand(at).then(Vec::new),
            BoosterKind::Hammer => {
                let mut queue = ChainQueue::new();
                if !r.apply_hammer(at, &mut queue) {
                    return None;
                }
                r.run_chain(&mut queue);
                Some(Vec::new())
            }
            BoosterKind::Glove => None,
        })?;

        match outcome {
            Some(done) => {
                self.boosters.consume(booster, self.sink.as_mut());
                info!(?booster, ?at, "booster used");
                Ok(done)
            }
            None => {
                debug!(?booster, ?at, "booster target refused");
                Ok(ActionOutcome::Ignored)
            }
        }
    }

    /// Run `action` against the board and, unless it declines by returning
    /// `None`, cascade to `Idle` and settle the outcome.
    ///
    /// `action` returns the swapped cells that steer helper placement on the
    /// first pass. With `free` set no move is charged for the whole action.
    fn resolve<F>(&mut self, free: bool, action: F) -> Result<Option<ActionOutcome>, EngineError>
    where
        F: FnOnce(&mut Resolver<'_>) -> Option<Vec<Coord>>,
    {
        let moves_before = self.progress.moves_left();
        let cleared_before = self.progress.tiles_cleared();

        self.processing = true;
        self.progress.set_free_moves(free);
        let result = {
            let mut resolver = Resolver {
                board: &mut self.board,
                vocabulary: self.level.vocabulary(),
                rng: self.rng.as_mut(),
                effects: self.effects.as_mut(),
                progress: &mut self.progress,
                sink: self.sink.as_mut(),
            };
            match action(&mut resolver) {
                Some(swapped) => resolver.run(&swapped).map(Some),
                None => Ok(None),
            }
        };
        self.progress.set_free_moves(false);
        self.processing = false;

        let Some(report) = result? else {
            return Ok(None);
        };
        debug!(?report, "cascade settled");

        let moves_spent = moves_before - self.progress.moves_left();
        let removed = self.progress.tiles_cleared() - cleared_before;

        let outcome = self.progress.settle(self.sink.as_mut(), self.effects.as_mut());
        if outcome != Outcome::InProgress {
            info!(?outcome, score = self.progress.score(), "level finished");
        }
        Ok(Some(ActionOutcome::Resolved {
            moves_spent,
            removed,
        }))
    }

    /// Rebuild the level from its definition with a fresh seed-derived RNG.
    ///
    /// Booster counts carry over; the armed booster and selection do not.
    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.episode_id = self.episode_id.wrapping_add(1);
        let mut rng = SeededRng::new(self.seed.wrapping_add(self.episode_id as u64));
        self.board = self.level.build_playable_board(&mut rng)?;
        self.rng = Box::new(rng);
        self.progress = Progress::new(self.level.goal_list()?, self.level.moves);
        self.selection = Selection::None;
        self.boosters.disarm();

        self.sink.publish(StateChange::MovesChanged {
            moves_left: self.progress.moves_left(),
        });
        self.sink.publish(StateChange::ScoreChanged { score: 0 });
        for goal in self.progress.goals().iter() {
            self.sink.publish(StateChange::GoalProgress {
                goal: goal.kind,
                remaining: goal.remaining,
            });
        }
        info!(episode = self.episode_id, "level restarted");
        Ok(())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            level_id: self.level.id,
            level_name: self.level.name.clone(),
            episode_id: self.episode_id,
            seed: self.seed,
            cols: self.board.cols(),
            rows: self.board.rows(),
            cells: self.board.coords().map(|c| self.board.get(c)).collect(),
            elements: self.level.elements.clone(),
            moves_left: self.progress.moves_left(),
            score: self.progress.score(),
            goals: self
                .progress
                .goals()
                .iter()
                .map(|g| GoalSnapshot {
                    kind: g.kind,
                    name: self.level.goal_name(g.kind).to_string(),
                    target: g.target,
                    remaining: g.remaining,
                })
                .collect(),
            boosters: BoosterSnapshot {
                wand: self.boosters.count(BoosterKind::Wand),
                hammer: self.boosters.count(BoosterKind::Hammer),
                glove: self.boosters.count(BoosterKind::Glove),
                armed: self.boosters.armed(),
            },
            selection: self.selection.selected(),
            outcome: self.progress.outcome(),
        }
    }
}

/// Flash a helper and clear its cell, counting one activation.
fn spend_helper(r: &mut Resolver<'_>, at: Coord, helper: HelperKind) {
    r.effects
        .play(&Effect::HelperFlash { at, helper }, EffectMode::Wait);
    r.board.set(at, Cell::Empty);
}

/// Color bomb plus line helper: the bomb is spent and every helper of the
/// line's kind fires.
fn bomb_with_line(r: &mut Resolver<'_>, bomb: Coord, line: HelperKind) {
    spend_helper(r, bomb, HelperKind::ColorBomb);
    r.finish_strike(
        DamageTracker::new(),
        Vec::new(),
        Tally {
            activations: 1,
            ..Tally::default()
        },
    );

    let mut queue = ChainQueue::new();
    for at in helpers_of(r.board, line) {
        queue.push(at, None);
    }
    r.run_chain(&mut queue);
}

/// Two color bombs: one activation that wipes every unprotected tile.
fn bomb_pair(r: &mut Resolver<'_>, a: Coord, b: Coord) {
    spend_helper(r, a, HelperKind::ColorBomb);
    spend_helper(r, b, HelperKind::ColorBomb);
    let removed = clear_board(r.board);
    r.finish_strike(
        DamageTracker::new(),
        removed,
        Tally {
            activations: 1,
            ..Tally::default()
        },
    );
}
