//! Match detection.
//!
//! Rows are scanned top-to-bottom (left-to-right within a row), then columns
//! left-to-right (top-to-bottom within a column). The scan order fixes the
//! order of returned groups, which in turn fixes helper spawn placement.

use crate::board::Board;
use crate::types::{Axis, Coord, ElementKind};

/// A run of three or more matchable tiles of one kind along one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    /// Cells in scan order.
    pub cells: Vec<Coord>,
    pub kind: ElementKind,
    pub axis: Axis,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.cells.contains(&at)
    }
}

/// Find every horizontal then vertical run of length >= 3.
///
/// A tile can belong to at most one horizontal and one vertical group.
pub fn find_matches(board: &Board) -> Vec<MatchGroup> {
    let mut groups = Vec::new();
    let cols = board.cols() as i8;
    let rows = board.rows() as i8;

    for row in 0..rows {
        scan_line(
            board,
            (0..cols).map(|col| Coord::new(col, row)),
            Axis::Horizontal,
            &mut groups,
        );
    }
    for col in 0..cols {
        scan_line(
            board,
            (0..rows).map(|row| Coord::new(col, row)),
            Axis::Vertical,
            &mut groups,
        );
    }
    groups
}

/// True when `find_matches` would return at least one group.
pub fn has_match(board: &Board) -> bool {
    let cols = board.cols() as i8;
    let rows = board.rows() as i8;
    let line_has_run = |line: &mut dyn Iterator<Item = Coord>| {
        let mut run = 0usize;
        let mut current: Option<ElementKind> = None;
        for at in line {
            let kind = board.get(at).matchable_kind();
            if kind.is_some() && kind == current {
                run += 1;
                if run >= 3 {
                    return true;
                }
            } else {
                current = kind;
                run = usize::from(kind.is_some());
            }
        }
        false
    };

    (0..rows).any(|row| line_has_run(&mut (0..cols).map(move |col| Coord::new(col, row))))
        || (0..cols).any(|col| line_has_run(&mut (0..rows).map(move |row| Coord::new(col, row))))
}

fn scan_line(
    board: &Board,
    line: impl Iterator<Item = Coord>,
    axis: Axis,
    out: &mut Vec<MatchGroup>,
) {
    let mut run: Vec<Coord> = Vec::new();
    let mut current: Option<ElementKind> = None;

    for at in line {
        let kind = board.get(at).matchable_kind();
        if kind.is_some() && kind == current {
            run.push(at);
            continue;
        }
        flush(&mut run, current, axis, out);
        current = kind;
        if kind.is_some() {
            run.push(at);
        }
    }
    flush(&mut run, current, axis, out);
}

fn flush(run: &mut Vec<Coord>, kind: Option<ElementKind>, axis: Axis, out: &mut Vec<MatchGroup>) {
    if let Some(kind) = kind {
        if run.len() >= 3 {
            out.push(MatchGroup {
                cells: std::mem::take(run),
                kind,
                axis,
            });
        }
    }
    run.clear();
}
