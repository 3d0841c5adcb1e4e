//! Error types for level loading and cascade resolution.
//!
//! Invalid player actions are not errors; they come back as
//! [`ActionOutcome::Ignored`](crate::game_state::ActionOutcome::Ignored).

use thiserror::Error;

/// A level definition that cannot be turned into a playable board.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("board must be between 1x1 and {max}x{max}, got {cols}x{rows}")]
    Dimensions { cols: u8, rows: u8, max: u8 },
    #[error("board is {cols}x{rows} but the level declares {expected_cols}x{expected_rows}")]
    BoardShape {
        cols: u8,
        rows: u8,
        expected_cols: u8,
        expected_rows: u8,
    },
    #[error("grid has {found} rows, expected {expected}")]
    RowCount { expected: u8, found: usize },
    #[error("grid row {row} has {found} cells, expected {expected}")]
    RowWidth { row: usize, expected: u8, found: usize },
    #[error("element vocabulary needs at least 3 kinds, got {0}")]
    Vocabulary(usize),
    #[error("unknown element kind `{0}`")]
    UnknownElement(String),
    #[error("unknown cell type `{0}`")]
    UnknownCell(String),
    #[error("unknown helper `{0}`")]
    UnknownHelper(String),
    #[error("{obstacle} strength must be 1 or 2, got {strength}")]
    Strength { obstacle: &'static str, strength: u8 },
    #[error("ice cell at ({col},{row}) has no element content")]
    IceWithoutContent { col: usize, row: usize },
    #[error("goal `{0}` does not name an element or box_full")]
    UnknownGoal(String),
    #[error("move budget must be positive")]
    NoMoves,
    #[error("no opening layout with a legal swap after {0} redraws")]
    Unplayable(u32),
    #[error("fixture line {line}: unrecognized token `{token}`")]
    Fixture { line: usize, token: String },
}

/// Unreachable configurations detected while resolving.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("cascade did not settle within {0} passes")]
    CascadeLimit(u32),
    #[error("no playable layout after {0} reshuffles")]
    ReshuffleLimit(u32),
}
