//! Input model: modifier keys, mouse buttons, and the interaction state machine.
//!
//! `Modifiers` and `Button` capture the user's intent at the time of a pointer
//! event. `InteractionState` is the single piece of mutable control state in
//! the engine: exactly one variant is active at a time, and each active
//! variant carries the context needed to compute deltas and emit the final
//! mutation when the gesture ends.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::NoteId;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
    /// Space bar is held (hand tool).
    pub space: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Whether a pointer-down should start panning instead of interacting.
#[must_use]
pub fn is_pan_gesture(button: Button, modifiers: Modifiers) -> bool {
    button == Button::Middle || (button == Button::Primary && modifiers.space)
}

/// The interaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the canvas.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// The user is dragging a note.
    Dragging {
        /// Id of the note being dragged.
        id: NoteId,
        /// Pointer position minus note position, in world space, at grab time.
        grab_offset: Point,
        /// Note x at the start of the drag.
        orig_x: f64,
        /// Note y at the start of the drag.
        orig_y: f64,
    },
    /// Connect mode is armed; waiting for the first and then the second note.
    ConnectSelecting {
        /// The first note clicked, once chosen.
        from: Option<NoteId>,
    },
}

impl InteractionState {
    /// Whether connect mode is armed.
    #[must_use]
    pub fn is_connecting(&self) -> bool {
        matches!(self, Self::ConnectSelecting { .. })
    }

    /// Whether a pointer gesture (drag or pan) owns the pointer.
    #[must_use]
    pub fn is_gesture(&self) -> bool {
        matches!(self, Self::Panning { .. } | Self::Dragging { .. })
    }

    /// Short label for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Panning { .. } => "panning",
            Self::Dragging { .. } => "dragging",
            Self::ConnectSelecting { .. } => "connect_selecting",
        }
    }
}
