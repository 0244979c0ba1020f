//! Drag interaction state machine
//!
//! Interprets raw pointer events on the button into "move" vs "tap".
//! A touch session lives from press-down to release/cancel and tracks
//! the window position and pointer coordinates at press time. Pointer
//! deltas are truncated to whole pixels; displacement strictly greater
//! than [`DRAG_THRESHOLD_PX`] on either axis marks the session as moved,
//! and once set the moved flag never reverts.

use super::WindowPosition;
use crate::constants::DRAG_THRESHOLD_PX;

/// Raw pointer event, independent of any host-runtime dispatch
/// mechanism. Coordinates are absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
    Cancel,
}

/// What the caller should do with the event just handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing to apply.
    None,
    /// The window should be repositioned immediately.
    Moved(WindowPosition),
    /// Release without crossing the drag threshold: a tap.
    Tap,
}

/// Ephemeral per-press state, created on press and destroyed on
/// release/cancel.
#[derive(Debug, Clone, Copy)]
struct TouchSession {
    start_window: WindowPosition,
    start_x: f32,
    start_y: f32,
    moved: bool,
}

/// Two-state machine: `Idle` (no session) and `Dragging` (session live).
#[derive(Debug, Default)]
pub struct DragState {
    session: Option<TouchSession>,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Feed one pointer event. `window_pos` is the current window
    /// position, captured into the session on press-down. Events that
    /// don't fit the current state (move/up without a press) are ignored.
    pub fn handle(&mut self, event: PointerEvent, window_pos: WindowPosition) -> DragOutcome {
        match event {
            PointerEvent::Down { x, y } => {
                self.session = Some(TouchSession {
                    start_window: window_pos,
                    start_x: x,
                    start_y: y,
                    moved: false,
                });
                DragOutcome::None
            }
            PointerEvent::Move { x, y } => {
                let Some(session) = self.session.as_mut() else {
                    return DragOutcome::None;
                };
                let dx = (x - session.start_x) as i32;
                let dy = (y - session.start_y) as i32;
                if dx.abs() > DRAG_THRESHOLD_PX || dy.abs() > DRAG_THRESHOLD_PX {
                    session.moved = true;
                    DragOutcome::Moved(session.start_window.offset(dx, dy))
                } else {
                    // Below the debounce threshold: no window move, and
                    // an earlier moved flag stays set.
                    DragOutcome::None
                }
            }
            PointerEvent::Up => match self.session.take() {
                Some(session) if !session.moved => DragOutcome::Tap,
                // Moved sessions just finalize the position already applied.
                _ => DragOutcome::None,
            },
            PointerEvent::Cancel => {
                self.session = None;
                DragOutcome::None
            }
        }
    }
}
