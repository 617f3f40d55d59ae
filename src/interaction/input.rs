use std::time::Duration;

use super::gesture::LONG_PRESS_TOLERANCE;

/// Travel below which a mouse press still counts as a click.
pub const MOUSE_CLICK_SLOP: f32 = 3.0;

/// The device a pointer stream comes from. Both drive the same drag
/// state machine; touch additionally gets long-press handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Mouse,
    Touch,
}

impl PointerKind {
    pub fn click_slop(self) -> f32 {
        match self {
            PointerKind::Mouse => MOUSE_CLICK_SLOP,
            PointerKind::Touch => LONG_PRESS_TOLERANCE,
        }
    }
}

/// Raw pointer input in timeline content coordinates.
///
/// `Move`, `Up` and `Cancel` are expected from anywhere on screen, not just
/// over the pressed bar, so a drag that leaves the bar still completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        kind: PointerKind,
        x: f32,
        y: f32,
        at: Duration,
    },
    Move {
        x: f32,
        y: f32,
        at: Duration,
    },
    Up {
        x: f32,
        y: f32,
        at: Duration,
    },
    /// `touchcancel`, focus loss, or the host tearing the view down.
    Cancel {
        at: Duration,
    },
}

impl PointerEvent {
    pub fn at(&self) -> Duration {
        match *self {
            PointerEvent::Down { at, .. }
            | PointerEvent::Move { at, .. }
            | PointerEvent::Up { at, .. }
            | PointerEvent::Cancel { at } => at,
        }
    }
}
