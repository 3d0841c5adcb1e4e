//! Pointer gestures: screen-to-grid transform, tap/swipe classification and
//! the press/release tracker that ties them together.

use crate::types::{Coord, Direction, Gesture, TAP_THRESHOLD_PX};

/// Screen position in pixels (or any unit the host treats as pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Fixed cell-size/offset mapping from screen space to grid cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    pub origin: Point,
    pub cell_w: f32,
    pub cell_h: f32,
    pub cols: u8,
    pub rows: u8,
}

impl GridTransform {
    pub fn new(origin: Point, cell_w: f32, cell_h: f32, cols: u8, rows: u8) -> Self {
        Self {
            origin,
            cell_w,
            cell_h,
            cols,
            rows,
        }
    }

    /// Grid cell under `p`, or `None` outside the board.
    pub fn to_cell(&self, p: Point) -> Option<Coord> {
        let fx = (p.x - self.origin.x) / self.cell_w;
        let fy = (p.y - self.origin.y) / self.cell_h;
        if !(fx >= 0.0 && fy >= 0.0) {
            return None;
        }
        let (col, row) = (fx as u32, fy as u32);
        if col >= self.cols as u32 || row >= self.rows as u32 {
            return None;
        }
        Some(Coord::new(col as i8, row as i8))
    }

    /// Center of `at` in screen space.
    pub fn center(&self, at: Coord) -> Point {
        Point::new(
            self.origin.x + (at.col as f32 + 0.5) * self.cell_w,
            self.origin.y + (at.row as f32 + 0.5) * self.cell_h,
        )
    }
}

/// Classify a press/release pair.
///
/// Travel under [`TAP_THRESHOLD_PX`] is a tap. Otherwise the angle is
/// quantized to the nearest grid axis; screen `y` grows downward.
pub fn classify(down: Point, up: Point) -> Gesture {
    let dx = up.x - down.x;
    let dy = up.y - down.y;
    if (dx * dx + dy * dy).sqrt() < TAP_THRESHOLD_PX {
        return Gesture::Tap;
    }

    let angle = dy.atan2(dx).to_degrees();
    let dir = if (-45.0..=45.0).contains(&angle) {
        Direction::Right
    } else if angle > 45.0 && angle < 135.0 {
        Direction::Down
    } else if angle >= 135.0 || angle <= -135.0 {
        Direction::Left
    } else {
        Direction::Up
    };
    Gesture::Swipe(dir)
}

/// Pairs pointer-down with pointer-up.
///
/// The gesture belongs to the cell under the press; a release anywhere,
/// even off the board, completes it.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pressed: Option<(Coord, Point)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Returns false (and forgets any earlier press) when it
    /// misses the board.
    pub fn press(&mut self, transform: &GridTransform, p: Point) -> bool {
        self.pressed = transform.to_cell(p).map(|c| (c, p));
        self.pressed.is_some()
    }

    /// Complete the gesture started by the last press.
    pub fn release(&mut self, p: Point) -> Option<(Coord, Gesture)> {
        let (at, down) = self.pressed.take()?;
        Some((at, classify(down, p)))
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }

    pub fn cancel(&mut self) {
        self.pressed = None;
    }
}
