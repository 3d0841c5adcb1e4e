//! Cascade loop: detect, resolve, drop, refill, repeat; then make sure the
//! settled board still has a move.
//!
//! ```text
//! Idle -> Resolving -> (Gravity -> Refill -> Resolving)* -> DeadlockCheck
//!      -> (Reshuffling -> DeadlockCheck -> Resolving)? -> Idle
//! ```
//!
//! The loop is synchronous. Every effect with [`EffectMode::Wait`] has
//! completed by the time [`EffectPlayer::play`] returns, so each phase sees the
//! fully applied result of the previous one.

use tracing::{debug, info, warn};

use crate::board::{Board, Cell, Tile};
use crate::effects::{EffectPlayer, StateSink};
use crate::error::EngineError;
use crate::goals::{Progress, Tally};
use crate::gravity::{apply_gravity, random_kind, refill};
use crate::helpers::{bomb_reference, fire_bomb, fire_line, spawn_for, ChainQueue};
use crate::matcher::{find_matches, has_match};
use crate::obstacles::DamageTracker;
use crate::rng::TileRng;
use crate::types::{Coord, Effect, EffectMode, ElementKind, MAX_CASCADE_ITERATIONS, MAX_RESHUFFLES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePhase {
    Idle,
    Resolving,
    Gravity,
    Refill,
    DeadlockCheck,
    Reshuffling,
}

/// What a cascade run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Resolving passes that found at least one group.
    pub match_passes: u32,
    pub reshuffles: u32,
}

/// True when some adjacent swap of two unprotected tiles would produce a match.
///
/// Exhaustive: every rightward and downward swap is simulated on a scratch
/// copy and checked with the full match detector.
pub fn has_available_moves(board: &Board) -> bool {
    let mut scratch = board.clone();
    let all: Vec<Coord> = board.coords().collect();
    for at in all {
        if !board.get(at).is_swappable() {
            continue;
        }
        for other in [at.offset(1, 0), at.offset(0, 1)] {
            match board.try_get(other) {
                Some(cell) if cell.is_swappable() => {}
                _ => continue,
            }
            scratch.swap(at, other);
            let found = has_match(&scratch);
            scratch.swap(at, other);
            if found {
                return true;
            }
        }
    }
    false
}

/// Regenerate every free element tile.
///
/// Free element tiles are removed (gravity and refill replace them); iced
/// tiles are re-typed in place and keep their ice; helpers and boxes stay.
pub fn reshuffle(board: &mut Board, vocabulary: usize, rng: &mut dyn TileRng) {
    let all: Vec<Coord> = board.coords().collect();
    for at in all {
        let Cell::Tile(tile) = board.get(at) else {
            continue;
        };
        if tile.element_kind().is_none() {
            continue;
        }
        match tile.ice {
            Some(strength) => {
                let kind = random_kind(vocabulary, rng);
                board.set(at, Cell::Tile(Tile::iced(kind, strength)));
            }
            None => board.set(at, Cell::Empty),
        }
    }
}

/// Everything one resolution needs, borrowed from the game state.
pub struct Resolver<'a> {
    pub board: &'a mut Board,
    pub vocabulary: usize,
    pub rng: &'a mut dyn TileRng,
    pub effects: &'a mut dyn EffectPlayer,
    pub progress: &'a mut Progress,
    pub sink: &'a mut dyn StateSink,
}

impl Resolver<'_> {
    /// Play removal and damage effects for one strike, then book it.
    pub(crate) fn finish_strike(
        &mut self,
        mut tracker: DamageTracker,
        removed: Vec<(Coord, ElementKind)>,
        mut tally: Tally,
    ) {
        for hit in tracker.take_hits() {
            self.effects.play(
                &Effect::ObstacleDamaged {
                    at: hit.at,
                    obstacle: hit.obstacle,
                    remaining: hit.remaining,
                },
                EffectMode::FireAndForget,
            );
        }
        let last = removed.len().saturating_sub(1);
        for (i, (at, kind)) in removed.iter().enumerate() {
            let mode = if i == last {
                EffectMode::Wait
            } else {
                EffectMode::FireAndForget
            };
            self.effects.play(&Effect::Remove { at: *at, kind: *kind }, mode);
        }
        tally.removed.extend(removed.iter().map(|(_, k)| *k));
        tally.boxes_cleared += tracker.boxes_destroyed();
        self.progress.record(&tally, self.sink);
    }

    /// Drain `queue`, firing each helper still on the board.
    ///
    /// A queued coordinate that no longer holds a helper was consumed by an
    /// earlier effect and is skipped.
    pub fn run_chain(&mut self, queue: &mut ChainQueue) {
        while let Some(next) = queue.pop() {
            let Some(helper) = self.board.get(next.at).helper_kind() else {
                continue;
            };
            debug!(at = ?next.at, ?helper, "helper activation");

            self.effects.play(
                &Effect::HelperFlash {
                    at: next.at,
                    helper,
                },
                EffectMode::Wait,
            );
            self.board.set(next.at, Cell::Empty);

            let mut tracker = DamageTracker::new();
            let removed = match helper.axis() {
                Some(axis) => {
                    self.effects.play(
                        &Effect::Sweep {
                            origin: next.at,
                            axis,
                        },
                        EffectMode::Wait,
                    );
                    fire_line(self.board, &mut tracker, next.at, axis, queue)
                }
                None => {
                    let reference = next
                        .reference
                        .or_else(|| bomb_reference(self.board, next.at, self.rng));
                    match reference {
                        Some(kind) => fire_bomb(self.board, &mut tracker, kind),
                        None => {
                            debug!(at = ?next.at, "color bomb found nothing to clear");
                            Vec::new()
                        }
                    }
                }
            };

            let tally = Tally {
                activations: 1,
                ..Tally::default()
            };
            self.finish_strike(tracker, removed, tally);
        }
    }

    /// One Resolving pass. Returns whether any group was found.
    ///
    /// Splash damage for every matched cell lands before any removal, and
    /// earned helpers are placed after all removals.
    pub fn resolve_matches(&mut self, swapped: &[Coord]) -> bool {
        let groups = find_matches(self.board);
        if groups.is_empty() {
            return false;
        }

        let spawns: Vec<_> = groups.iter().filter_map(|g| spawn_for(g, swapped)).collect();

        let mut tracker = DamageTracker::new();
        for group in &groups {
            for at in &group.cells {
                tracker.splash_around(self.board, *at);
            }
        }

        let mut removed = Vec::new();
        for group in &groups {
            for at in &group.cells {
                if let Some(kind) = self.board.get(*at).matchable_kind() {
                    self.board.set(*at, Cell::Empty);
                    removed.push((*at, kind));
                }
            }
        }
        self.finish_strike(tracker, removed, Tally::default());

        for (at, helper) in spawns {
            if self.board.get(at).is_empty() {
                self.board.set(at, Cell::Tile(Tile::helper(helper)));
                self.effects
                    .play(&Effect::HelperSpawn { at, helper }, EffectMode::Wait);
            }
        }
        true
    }

    fn drop_tiles(&mut self) {
        let drops = apply_gravity(self.board);
        let last = drops.len().saturating_sub(1);
        for (i, (from, to)) in drops.into_iter().enumerate() {
            let mode = if i == last {
                EffectMode::Wait
            } else {
                EffectMode::FireAndForget
            };
            self.effects.play(&Effect::Drop { from, to }, mode);
        }
    }

    fn refill(&mut self) {
        let spawned = refill(self.board, self.vocabulary, self.rng);
        let last = spawned.len().saturating_sub(1);
        for (i, (at, kind)) in spawned.into_iter().enumerate() {
            let mode = if i == last {
                EffectMode::Wait
            } else {
                EffectMode::FireAndForget
            };
            self.effects.play(&Effect::Spawn { at, kind }, mode);
        }
    }

    /// Run the cascade to `Idle`.
    ///
    /// `swapped` holds the two cells of the swap that started this cascade;
    /// it steers helper placement on the first pass only. When the board has
    /// holes left by an activation or booster, the loop starts at `Gravity`.
    pub fn run(&mut self, swapped: &[Coord]) -> Result<CascadeReport, EngineError> {
        let mut report = CascadeReport::default();
        let mut passes = 0u32;
        let mut swapped = swapped;
        let mut after_reshuffle = false;
        let mut phase = if self.board.count_empty() > 0 {
            CascadePhase::Gravity
        } else {
            CascadePhase::Resolving
        };

        while phase != CascadePhase::Idle {
            debug!(?phase, "cascade");
            phase = match phase {
                CascadePhase::Resolving => {
                    passes += 1;
                    if passes > MAX_CASCADE_ITERATIONS {
                        warn!(passes, "cascade did not settle");
                        return Err(EngineError::CascadeLimit(MAX_CASCADE_ITERATIONS));
                    }
                    let found = self.resolve_matches(swapped);
                    swapped = &[];
                    if found {
                        report.match_passes += 1;
                        CascadePhase::Gravity
                    } else {
                        CascadePhase::DeadlockCheck
                    }
                }
                CascadePhase::Gravity => {
                    swapped = &[];
                    self.drop_tiles();
                    CascadePhase::Refill
                }
                CascadePhase::Refill => {
                    self.refill();
                    CascadePhase::Resolving
                }
                CascadePhase::DeadlockCheck => {
                    if !has_available_moves(self.board) {
                        CascadePhase::Reshuffling
                    } else if after_reshuffle {
                        after_reshuffle = false;
                        CascadePhase::Resolving
                    } else {
                        CascadePhase::Idle
                    }
                }
                CascadePhase::Reshuffling => {
                    report.reshuffles += 1;
                    if report.reshuffles > MAX_RESHUFFLES {
                        warn!(reshuffles = report.reshuffles, "board stays deadlocked");
                        return Err(EngineError::ReshuffleLimit(MAX_RESHUFFLES));
                    }
                    info!(attempt = report.reshuffles, "no moves left, reshuffling");
                    self.effects.play(&Effect::Reshuffle, EffectMode::Wait);
                    reshuffle(self.board, self.vocabulary, self.rng);
                    self.drop_tiles();
                    self.refill();
                    after_reshuffle = true;
                    CascadePhase::DeadlockCheck
                }
                CascadePhase::Idle => CascadePhase::Idle,
            };
        }
        Ok(report)
    }
}
