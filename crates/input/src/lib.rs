//! Pointer and keyboard input (engine-facing).
//!
//! This crate is independent of any UI framework beyond `crossterm` event
//! types. It turns raw pointer-down / pointer-up positions into a grid cell
//! plus a [`Gesture`](crate::types::Gesture), and maps keys to booster and
//! restart commands. Deciding what a gesture *does* is the engine's job.

pub mod gesture;
pub mod map;

pub use tile_match_types as types;

pub use gesture::{classify, GridTransform, Point, PointerTracker};
pub use map::{handle_key_event, handle_mouse_event, should_quit, term_point, KeyCommand, PointerEvent, TERM_CELL_PX};
