//! Core match-3 engine - deterministic, synchronous and testable
//!
//! This crate holds the game rules and the cascade state machine. It has no
//! dependencies on rendering, terminals or networking. Visual effects and
//! state display are reached only through the [`EffectPlayer`] and
//! [`StateSink`] traits, so the same engine runs under a terminal UI, a TCP
//! controller or a headless test.
//!
//! # Module Structure
//!
//! - [`board`]: the grid of cells, holes and obstacle overlays, plus ASCII fixtures
//! - [`matcher`]: row-then-column run detection
//! - [`obstacles`]: ice and box damage with per-pass idempotence
//! - [`helpers`]: helper spawn rules, line sweeps, color bombs and chain queues
//! - [`gravity`]: per-column compaction around holes and random refill
//! - [`cascade`]: the resolve/drop/refill loop, deadlock check and reshuffle
//! - [`goals`]: goals, move budget, score and the win/loss decision
//! - [`selection`]: gesture interpretation against the current selection
//! - [`boosters`]: booster inventory and the wand / hammer actions
//! - [`level`]: JSON level definitions and board construction
//! - [`game_state`]: ties everything together behind [`GameState::pointer`]
//!
//! # Example
//!
//! ```
//! use tile_match_core::{GameState, LevelDefinition};
//! use tile_match_core::types::{Coord, Gesture};
//!
//! let level = LevelDefinition::tutorial().unwrap();
//! let mut game = GameState::new(level, 12345).unwrap();
//!
//! // A tap on a plain tile selects it.
//! let at = game
//!     .board()
//!     .coords()
//!     .find(|c| game.board().get(*c).matchable_kind().is_some())
//!     .unwrap();
//! game.pointer(at, Gesture::Tap).unwrap();
//! assert_eq!(game.snapshot().selection, Some(at));
//! ```

pub mod board;
pub mod boosters;
pub mod cascade;
pub mod effects;
pub mod error;
pub mod game_state;
pub mod goals;
pub mod gravity;
pub mod helpers;
pub mod level;
pub mod matcher;
pub mod obstacles;
pub mod rng;
pub mod selection;
pub mod snapshot;

pub use tile_match_types as types;

pub use board::{Board, Cell, Tile, TileContent};
pub use boosters::BoosterInventory;
pub use cascade::{has_available_moves, CascadePhase, CascadeReport};
pub use effects::{EffectPlayer, InstantEffects, NullSink, RecordingEffects, RecordingSink, StateSink, TracingSink};
pub use error::{EngineError, LevelError};
pub use game_state::{ActionOutcome, GameState};
pub use goals::{Goal, Goals, Outcome};
pub use level::LevelDefinition;
pub use matcher::{find_matches, MatchGroup};
pub use rng::{SeededRng, SequenceRng, TileRng};
pub use selection::Selection;
pub use snapshot::{BoosterSnapshot, GameSnapshot, GoalSnapshot};
