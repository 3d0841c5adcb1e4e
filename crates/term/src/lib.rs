//! Terminal front end for the match-3 board.
//!
//! Everything is drawn into a [`FrameBuffer`] of styled glyphs first; no
//! widget toolkit is involved.
//!
//! - [`GameView`] is pure: snapshot in, framebuffer and board layout out.
//! - [`TerminalRenderer`] owns the terminal (raw mode, alternate screen,
//!   mouse capture) and rewrites only the spans that changed between frames.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tile_match_core as core;
pub use tile_match_types as types;

pub use fb::{FrameBuffer, Glyph, GlyphStyle, Rgb};
pub use game_view::{AdapterStatusView, BoardLayout, GameView, Viewport};
pub use renderer::{dirty_spans, encode_frame, Span, TerminalRenderer};
