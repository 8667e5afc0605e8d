use std::time::Duration;

use web_time::SystemTime;

use crate::control::{
    ClickEvent, MapEvent, MouseButton, MouseButtonsState, PointerMoveEvent, RawUserEvent,
};
use crate::engine::{MapEngine, ScreenPosition};

const DRAG_THRESHOLD: f64 = 3.0;

/// Converts [`RawUserEvent`]s into [`MapEvent`]s.
///
/// A press of the primary button followed by its release is a click, unless the pointer travelled more than the
/// drag threshold while any button was held, in which case the map was dragged and no click is produced. A click
/// timeout can be set to also reject long presses.
#[derive(Debug)]
pub struct EventProcessor {
    pointer_position: ScreenPosition,
    pointer_pressed_position: ScreenPosition,
    buttons_state: MouseButtonsState,
    last_pressed_time: SystemTime,
    dragging: bool,
    click_timeout: Option<Duration>,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            pointer_position: Default::default(),
            pointer_pressed_position: Default::default(),
            buttons_state: Default::default(),
            last_pressed_time: SystemTime::UNIX_EPOCH,
            dragging: false,
            click_timeout: None,
        }
    }
}

impl EventProcessor {
    /// Sets the longest press that still counts as a click. `None` (the default) accepts presses of any length.
    pub fn with_click_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.click_timeout = timeout;
        self
    }

    /// Processes the event at the current time.
    pub fn process<E: MapEngine + ?Sized>(
        &mut self,
        event: RawUserEvent,
        engine: &E,
    ) -> Vec<MapEvent> {
        self.process_at(event, engine, SystemTime::now())
    }

    /// Processes the event as if it happened at `now`. `engine` converts click positions into map coordinates.
    pub fn process_at<E: MapEngine + ?Sized>(
        &mut self,
        event: RawUserEvent,
        engine: &E,
        now: SystemTime,
    ) -> Vec<MapEvent> {
        match event {
            RawUserEvent::ButtonPressed(button) => {
                // A press while another button is held continues the same gesture.
                if !self.buttons_state.any_pressed() {
                    self.last_pressed_time = now;
                    self.pointer_pressed_position = self.pointer_position;
                    self.dragging = false;
                }
                self.buttons_state.set(button, true);

                vec![]
            }
            RawUserEvent::ButtonReleased(button) => {
                let was_pressed = self.buttons_state.is_pressed(button);
                self.buttons_state.set(button, false);

                let was_dragging = self.dragging;
                if !self.buttons_state.any_pressed() {
                    self.dragging = false;
                }

                let in_time = self.click_timeout.map_or(true, |timeout| {
                    now.duration_since(self.last_pressed_time)
                        .unwrap_or_default()
                        < timeout
                });
                if button != MouseButton::Left || !was_pressed || was_dragging || !in_time {
                    return vec![];
                }

                match engine.pixel_to_coordinate(self.pointer_position) {
                    Some(coordinate) => vec![MapEvent::Click(ClickEvent {
                        pixel: self.pointer_position,
                        coordinate,
                    })],
                    None => {
                        log::debug!(
                            "Click at {:?} is outside of the map",
                            self.pointer_position
                        );
                        vec![]
                    }
                }
            }
            RawUserEvent::PointerMoved(position) => {
                self.pointer_position = position;

                if self.buttons_state.any_pressed()
                    && !self.dragging
                    && position.taxicab_distance(&self.pointer_pressed_position) > DRAG_THRESHOLD
                {
                    self.dragging = true;
                }

                vec![MapEvent::PointerMoved(PointerMoveEvent {
                    pixel: position,
                    is_dragging: self.dragging,
                })]
            }
            RawUserEvent::PopupCloseRequested => vec![MapEvent::PopupClose],
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::engine::headless::HeadlessEngine;
    use crate::engine::MapCoordinate;

    fn at(millis: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(1_000_000 + millis)
    }

    fn moved(x: f64, y: f64) -> RawUserEvent {
        RawUserEvent::PointerMoved(ScreenPosition::new(x, y))
    }

    #[test]
    fn plain_moves_are_not_dragging() {
        let engine = HeadlessEngine::default();
        let mut processor = EventProcessor::default();
        let events = processor.process_at(moved(10.0, 10.0), &engine, at(0));
        assert_eq!(
            events,
            vec![MapEvent::PointerMoved(PointerMoveEvent {
                pixel: ScreenPosition::new(10.0, 10.0),
                is_dragging: false,
            })]
        );
    }

    #[test]
    fn quick_press_release_is_a_click() {
        let engine = HeadlessEngine::default();
        let mut processor = EventProcessor::default();
        processor.process_at(moved(10.0, 20.0), &engine, at(0));
        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Left), &engine, at(10));
        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Left),
            &engine,
            at(50),
        );

        assert_eq!(
            events,
            vec![MapEvent::Click(ClickEvent {
                pixel: ScreenPosition::new(10.0, 20.0),
                coordinate: MapCoordinate::new(10.0, -20.0),
            })]
        );
    }

    #[test]
    fn small_jitter_is_still_a_click() {
        let engine = HeadlessEngine::default();
        let mut processor = EventProcessor::default();
        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Left), &engine, at(0));
        let events = processor.process_at(moved(1.0, 1.0), &engine, at(10));
        assert_matches!(
            events[0],
            MapEvent::PointerMoved(PointerMoveEvent {
                is_dragging: false,
                ..
            })
        );

        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Left),
            &engine,
            at(20),
        );
        assert_matches!(events[..], [MapEvent::Click(_)]);
    }

    #[test]
    fn drag_produces_dragging_moves_and_no_click() {
        let engine = HeadlessEngine::default();
        let mut processor = EventProcessor::default();
        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Left), &engine, at(0));

        let events = processor.process_at(moved(5.0, 0.0), &engine, at(10));
        assert_matches!(
            events[0],
            MapEvent::PointerMoved(PointerMoveEvent {
                is_dragging: true,
                ..
            })
        );

        let events = processor.process_at(moved(1.0, 0.0), &engine, at(20));
        assert_matches!(
            events[0],
            MapEvent::PointerMoved(PointerMoveEvent {
                is_dragging: true,
                ..
            })
        );

        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Left),
            &engine,
            at(30),
        );
        assert!(events.is_empty());

        let events = processor.process_at(moved(2.0, 0.0), &engine, at(40));
        assert_matches!(
            events[0],
            MapEvent::PointerMoved(PointerMoveEvent {
                is_dragging: false,
                ..
            })
        );
    }

    #[test]
    fn long_press_is_a_click_by_default() {
        let engine = HeadlessEngine::default();
        let mut processor = EventProcessor::default();
        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Left), &engine, at(0));
        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Left),
            &engine,
            at(1500),
        );
        assert_matches!(events[..], [MapEvent::Click(_)]);
    }

    #[test]
    fn click_timeout_rejects_long_press() {
        let engine = HeadlessEngine::default();
        let mut processor =
            EventProcessor::default().with_click_timeout(Some(Duration::from_millis(200)));
        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Left), &engine, at(0));
        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Left),
            &engine,
            at(500),
        );
        assert!(events.is_empty());

        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Left), &engine, at(600));
        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Left),
            &engine,
            at(650),
        );
        assert_matches!(events[..], [MapEvent::Click(_)]);
    }

    #[test]
    fn other_buttons_are_not_clicks() {
        let engine = HeadlessEngine::default();
        let mut processor = EventProcessor::default();
        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Right), &engine, at(0));
        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Right),
            &engine,
            at(10),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn second_button_during_drag_keeps_dragging() {
        let engine = HeadlessEngine::default();
        let mut processor = EventProcessor::default();
        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Left), &engine, at(0));
        let events = processor.process_at(moved(50.0, 0.0), &engine, at(10));
        assert_matches!(
            events[0],
            MapEvent::PointerMoved(PointerMoveEvent {
                is_dragging: true,
                ..
            })
        );

        processor.process_at(RawUserEvent::ButtonPressed(MouseButton::Right), &engine, at(20));
        let events = processor.process_at(moved(51.0, 0.0), &engine, at(30));
        assert_matches!(
            events[0],
            MapEvent::PointerMoved(PointerMoveEvent {
                is_dragging: true,
                ..
            })
        );

        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Left),
            &engine,
            at(40),
        );
        assert!(events.is_empty());
        let events = processor.process_at(
            RawUserEvent::ButtonReleased(MouseButton::Right),
            &engine,
            at(50),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn close_request_is_forwarded() {
        let engine = HeadlessEngine::default();
        let mut processor = EventProcessor::default();
        assert_eq!(
            processor.process_at(RawUserEvent::PopupCloseRequested, &engine, at(0)),
            vec![MapEvent::PopupClose]
        );
    }
}
