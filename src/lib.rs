//! Tile Match (workspace facade crate).
//!
//! Re-exports the member crates as `tile_match::{core, adapter, term, input, types}`
//! so the binaries, integration tests and benches share one import path.

pub use tile_match_adapter as adapter;
pub use tile_match_core as core;
pub use tile_match_input as input;
pub use tile_match_term as term;
pub use tile_match_types as types;
