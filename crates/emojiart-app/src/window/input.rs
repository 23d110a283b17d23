//! Winit pointer input translated into canvas touches.
//!
//! Positions arrive in logical points. A touch or mouse press that starts on
//! an egui area never reaches the canvas, and neither do its later moves.

use emojiart_core::{Gesture, TouchEvent, TouchPhase};
use kurbo::Point;
use std::collections::HashSet;
use std::time::Instant;
use winit::event::{ElementState, MouseButton, TouchPhase as WinitPhase};

/// Touch id the left mouse button is reported under.
pub const MOUSE_TOUCH_ID: u64 = u64::MAX;

#[derive(Debug)]
pub struct PointerInput {
    epoch: Instant,
    cursor: Point,
    /// Ids of presses that started on the canvas and are still down.
    active: HashSet<u64>,
    /// Accumulated trackpad pinch scale, while one is live.
    pinch: Option<f64>,
}

impl Default for PointerInput {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerInput {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            cursor: Point::ZERO,
            active: HashSet::new(),
            pinch: None,
        }
    }

    /// Last known mouse cursor position.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn event(&self, phase: TouchPhase, id: u64, position: Point) -> TouchEvent {
        TouchEvent::new(phase, id, position, self.now_ms())
    }

    pub fn cursor_moved(&mut self, position: Point) -> Option<TouchEvent> {
        self.cursor = position;
        self.active
            .contains(&MOUSE_TOUCH_ID)
            .then(|| self.event(TouchPhase::Move, MOUSE_TOUCH_ID, position))
    }

    /// Left button presses and releases act as a single touch at the cursor.
    pub fn mouse_button(&mut self, state: ElementState, button: MouseButton, blocked: bool) -> Option<TouchEvent> {
        if button != MouseButton::Left {
            return None;
        }
        self.press(MOUSE_TOUCH_ID, state == ElementState::Pressed, self.cursor, blocked)
    }

    pub fn touch(&mut self, phase: WinitPhase, id: u64, position: Point, blocked: bool) -> Option<TouchEvent> {
        match phase {
            WinitPhase::Started => self.press(id, true, position, blocked),
            WinitPhase::Moved => self
                .active
                .contains(&id)
                .then(|| self.event(TouchPhase::Move, id, position)),
            WinitPhase::Ended => self.press(id, false, position, blocked),
            WinitPhase::Cancelled => self
                .active
                .remove(&id)
                .then(|| self.event(TouchPhase::Cancel, id, position)),
        }
    }

    fn press(&mut self, id: u64, down: bool, position: Point, blocked: bool) -> Option<TouchEvent> {
        if down {
            if blocked || !self.active.insert(id) {
                return None;
            }
            Some(self.event(TouchPhase::Start, id, position))
        } else {
            self.active
                .remove(&id)
                .then(|| self.event(TouchPhase::End, id, position))
        }
    }

    /// Trackpad pinch. `delta` is the scale change since the previous event.
    pub fn pinch(&mut self, delta: f64, phase: WinitPhase, blocked: bool) -> Option<Gesture> {
        match phase {
            WinitPhase::Started => {
                if blocked {
                    return None;
                }
                let scale = 1.0 + delta;
                self.pinch = Some(scale);
                Some(Gesture::PinchChanged { scale })
            }
            WinitPhase::Moved => {
                let scale = self.pinch.as_mut()?;
                *scale *= 1.0 + delta;
                Some(Gesture::PinchChanged { scale: *scale })
            }
            WinitPhase::Ended => {
                let scale = self.pinch.take()? * (1.0 + delta);
                Some(Gesture::PinchEnded { scale })
            }
            WinitPhase::Cancelled => self.pinch.take().map(|_| Gesture::Cancelled),
        }
    }

    /// Cancel every live press, e.g. when the window loses focus.
    pub fn cancel_all(&mut self) -> Vec<TouchEvent> {
        let cursor = self.cursor;
        let mut ids: Vec<u64> = self.active.drain().collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| self.event(TouchPhase::Cancel, id, cursor))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(events: &[Option<TouchEvent>]) -> Vec<Option<TouchPhase>> {
        events.iter().map(|e| e.map(|e| e.phase)).collect()
    }

    #[test]
    fn test_mouse_acts_as_touch() {
        let mut input = PointerInput::new();
        assert!(input.cursor_moved(Point::new(5.0, 6.0)).is_none());

        let down = input.mouse_button(ElementState::Pressed, MouseButton::Left, false).unwrap();
        assert_eq!(down.phase, TouchPhase::Start);
        assert_eq!(down.id, MOUSE_TOUCH_ID);
        assert_eq!(down.position, Point::new(5.0, 6.0));

        let moved = input.cursor_moved(Point::new(9.0, 6.0)).unwrap();
        assert_eq!(moved.phase, TouchPhase::Move);

        let up = input.mouse_button(ElementState::Released, MouseButton::Left, false).unwrap();
        assert_eq!(up.phase, TouchPhase::End);
        assert_eq!(up.position, Point::new(9.0, 6.0));
        assert!(input.cursor_moved(Point::ZERO).is_none());
    }

    #[test]
    fn test_other_buttons_ignored() {
        let mut input = PointerInput::new();
        assert!(input.mouse_button(ElementState::Pressed, MouseButton::Right, false).is_none());
        assert!(input.mouse_button(ElementState::Released, MouseButton::Right, false).is_none());
    }

    #[test]
    fn test_blocked_press_is_swallowed() {
        let mut input = PointerInput::new();
        assert!(input.mouse_button(ElementState::Pressed, MouseButton::Left, true).is_none());
        assert!(input.cursor_moved(Point::new(1.0, 1.0)).is_none());
        // The release belongs to the egui press, even over the canvas
        assert!(input.mouse_button(ElementState::Released, MouseButton::Left, false).is_none());
    }

    #[test]
    fn test_touch_lifecycle() {
        let mut input = PointerInput::new();
        let p = Point::new(10.0, 20.0);
        let events = [
            input.touch(WinitPhase::Started, 1, p, false),
            input.touch(WinitPhase::Started, 2, p, true),
            input.touch(WinitPhase::Moved, 1, p, true),
            input.touch(WinitPhase::Moved, 2, p, false),
            input.touch(WinitPhase::Ended, 1, p, false),
            input.touch(WinitPhase::Ended, 2, p, false),
        ];
        assert_eq!(
            phases(&events),
            vec![Some(TouchPhase::Start), None, Some(TouchPhase::Move), None, Some(TouchPhase::End), None]
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut input = PointerInput::new();
        input.touch(WinitPhase::Started, 3, Point::ZERO, false);
        input.mouse_button(ElementState::Pressed, MouseButton::Left, false);

        let cancelled = input.cancel_all();
        assert_eq!(cancelled.len(), 2);
        assert!(cancelled.iter().all(|e| e.phase == TouchPhase::Cancel));
        assert!(input.touch(WinitPhase::Ended, 3, Point::ZERO, false).is_none());
        assert!(input.cancel_all().is_empty());
    }

    #[test]
    fn test_trackpad_pinch_accumulates() {
        let mut input = PointerInput::new();
        assert!(input.pinch(0.1, WinitPhase::Moved, false).is_none());

        let Some(Gesture::PinchChanged { scale }) = input.pinch(0.0, WinitPhase::Started, false) else {
            panic!("expected pinch start");
        };
        assert!((scale - 1.0).abs() < 1e-9);
        input.pinch(1.0, WinitPhase::Moved, false);
        let Some(Gesture::PinchEnded { scale }) = input.pinch(0.5, WinitPhase::Ended, false) else {
            panic!("expected pinch end");
        };
        assert!((scale - 3.0).abs() < 1e-9);

        assert!(input.pinch(0.2, WinitPhase::Started, true).is_none());
        input.pinch(0.2, WinitPhase::Started, false);
        assert_eq!(input.pinch(0.0, WinitPhase::Cancelled, false), Some(Gesture::Cancelled));
    }
}
