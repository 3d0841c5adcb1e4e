//! Mapping from terminal events to host commands and pointer points.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::gesture::Point;
use crate::types::BoosterKind;

/// Nominal pixel size of one terminal character cell. Pointer travel is
/// measured in these units so the tap threshold means the same thing in a
/// terminal as on a touch screen.
pub const TERM_CELL_PX: (f32, f32) = (8.0, 16.0);

/// Keyboard commands outside the pointer path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Arm(BoosterKind),
    Disarm,
    Restart,
}

/// Pointer events in pseudo-pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Up(Point),
}

/// Map keyboard input to commands.
pub fn handle_key_event(key: KeyEvent) -> Option<KeyCommand> {
    match key.code {
        KeyCode::Char('1') | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(KeyCommand::Arm(BoosterKind::Wand))
        }
        KeyCode::Char('2') | KeyCode::Char('h') | KeyCode::Char('H') => {
            Some(KeyCommand::Arm(BoosterKind::Hammer))
        }
        KeyCode::Char('3') | KeyCode::Char('g') | KeyCode::Char('G') => {
            Some(KeyCommand::Arm(BoosterKind::Glove))
        }
        KeyCode::Esc => Some(KeyCommand::Disarm),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(KeyCommand::Restart),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Terminal cell position to the center of that cell in pseudo-pixels.
pub fn term_point(column: u16, row: u16) -> Point {
    Point::new(
        (column as f32 + 0.5) * TERM_CELL_PX.0,
        (row as f32 + 0.5) * TERM_CELL_PX.1,
    )
}

/// Left-button press and release become pointer-down / pointer-up. Drags,
/// moves, scrolls and other buttons are dropped.
pub fn handle_mouse_event(mouse: MouseEvent) -> Option<PointerEvent> {
    let p = term_point(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down(p)),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up(p)),
        _ => None,
    }
}
