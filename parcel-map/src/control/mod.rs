//! Interactivity of the parcel map.
//!
//! User interaction handling is done in two steps:
//! 1. The host converts OS events into [`RawUserEvent`]s and gives them to the [`EventProcessor`], which keeps
//!    track of the pressed buttons and produces [`MapEvent`]s: pointer moves that know whether the map is being
//!    dragged, and clicks that know the map coordinate under the pointer.
//! 2. [`MapEventHandler`]s (most notably [`ParcelMap`](crate::ParcelMap)) change the state of the application
//!    based on the map events.

use maybe_sync::{MaybeSend, MaybeSync};

use crate::engine::{MapCoordinate, ScreenPosition};

mod event_processor;

pub use event_processor::EventProcessor;

/// Handler of [`MapEvent`]s.
pub trait MapEventHandler {
    /// Handle the event.
    fn handle(&mut self, event: &MapEvent) -> EventPropagation;
}

impl<T: FnMut(&MapEvent) -> EventPropagation> MapEventHandler for T
where
    T: MaybeSync + MaybeSend,
{
    fn handle(&mut self, event: &MapEvent) -> EventPropagation {
        self(event)
    }
}

/// Raw user interaction event, as reported by the host window system.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RawUserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton),
    /// A mouse button was released.
    ButtonReleased(MouseButton),
    /// Mouse pointer was moved to the given screen pixel position.
    PointerMoved(ScreenPosition),
    /// The dismiss control of the popup was activated.
    PopupCloseRequested,
}

/// Event the interaction logic of the map reacts to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MapEvent {
    /// Pointer moved.
    PointerMoved(PointerMoveEvent),
    /// Primary button was clicked without dragging the map.
    Click(ClickEvent),
    /// The dismiss control of the popup was activated.
    PopupClose,
}

/// Pointer movement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    /// Pointer position on the screen in pixels from the top-left corner.
    pub pixel: ScreenPosition,
    /// True if the pointer moves with a button held down far enough from the place it was pressed.
    pub is_dragging: bool,
}

/// Single click.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClickEvent {
    /// Pointer position on the screen in pixels from the top-left corner.
    pub pixel: ScreenPosition,
    /// Map coordinate under the pointer.
    pub coordinate: MapCoordinate,
}

/// Value returned by a [`MapEventHandler`] to indicate the status of the event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventPropagation {
    /// Event should be propagated to the next handler, and the host may run its default action.
    Propagate,
    /// Event was handled; the next handlers and the host default action must be skipped.
    Stop,
}

/// Mouse button enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Context menu button.
    Right,
    /// Anything else.
    Other,
}

/// Pressed state of the mouse buttons.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MouseButtonsState {
    left: bool,
    middle: bool,
    right: bool,
}

impl MouseButtonsState {
    /// Returns true if any of the tracked buttons is pressed.
    pub fn any_pressed(&self) -> bool {
        self.left || self.middle || self.right
    }

    /// Returns true if the given button is pressed.
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
            MouseButton::Other => false,
        }
    }

    pub(crate) fn set(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Middle => self.middle = pressed,
            MouseButton::Right => self.right = pressed,
            MouseButton::Other => {}
        }
    }
}
