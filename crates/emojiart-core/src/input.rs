//! Touch input and gesture recognition.
//!
//! Raw touches come in one at a time; [`GestureRecognizer`] turns them into
//! taps, double taps, drags and pinches for the canvas.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Finger down.
    Start,
    /// Finger moved.
    Move,
    /// Finger up.
    End,
    /// The input system abandoned the touch.
    Cancel,
}

/// A change to one touch point, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Touch identifier (stable while the finger is down).
    pub id: u64,
    pub position: Point,
    /// Milliseconds on any monotonic clock.
    pub timestamp_ms: u64,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, id: u64, position: Point, timestamp_ms: u64) -> Self {
        Self {
            phase,
            id,
            position,
            timestamp_ms,
        }
    }
}

/// Recognized gestures from touch input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum Gesture {
    Tap { position: Point },
    DoubleTap { position: Point },
    /// Drag in progress; `translation` is measured from `start`.
    DragChanged { start: Point, translation: Vec2 },
    DragEnded { start: Point, translation: Vec2 },
    /// Pinch in progress; `scale` is relative to the finger distance at its start.
    PinchChanged { scale: f64 },
    PinchEnded { scale: f64 },
    /// The drag or pinch in progress was abandoned.
    Cancelled,
}

/// Tap and double-tap thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Movement in pixels before a press becomes a drag.
    pub tap_slop: f64,
    /// Longest press that still counts as a tap.
    pub tap_max_ms: u64,
    /// Longest gap between the taps of a double tap.
    pub double_tap_ms: u64,
    /// Farthest apart the taps of a double tap may land.
    pub double_tap_distance: f64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            tap_slop: 10.0,
            tap_max_ms: 300,
            double_tap_ms: 300,
            double_tap_distance: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Phase {
    #[default]
    Idle,
    /// One finger down, not yet moved far enough to be a drag.
    Pressed { id: u64, start: Point, start_ms: u64 },
    Dragging { id: u64, start: Point },
    Pinching { ids: [u64; 2], initial_distance: f64 },
    /// A drag or pinch ended early; wait for the remaining fingers to lift.
    Draining,
}

/// Turns raw touch events into gestures.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    config: RecognizerConfig,
    phase: Phase,
    touches: HashMap<u64, Point>,
    /// Time and place of the last single tap, for double-tap detection.
    last_tap: Option<(u64, Point)>,
}

impl GestureRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Number of fingers currently down.
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    /// Feed one touch event; returns the gestures it completes or advances.
    pub fn handle(&mut self, event: TouchEvent) -> Vec<Gesture> {
        match event.phase {
            TouchPhase::Start => self.touch_start(event),
            TouchPhase::Move => self.touch_move(event),
            TouchPhase::End => self.touch_end(event),
            TouchPhase::Cancel => self.touch_cancel(event),
        }
    }

    fn touch_start(&mut self, event: TouchEvent) -> Vec<Gesture> {
        self.touches.insert(event.id, event.position);
        let mut gestures = Vec::new();

        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Pressed {
                    id: event.id,
                    start: event.position,
                    start_ms: event.timestamp_ms,
                };
            }
            Phase::Pressed { id, .. } => self.begin_pinch(id, event.id),
            Phase::Dragging { id, .. } => {
                gestures.push(Gesture::Cancelled);
                self.begin_pinch(id, event.id);
            }
            // Extra fingers do not change a pinch
            Phase::Pinching { .. } | Phase::Draining => {}
        }
        gestures
    }

    fn begin_pinch(&mut self, first: u64, second: u64) {
        let initial_distance = self.distance(first, second).unwrap_or(0.0);
        self.phase = Phase::Pinching {
            ids: [first, second],
            initial_distance,
        };
        self.last_tap = None;
    }

    fn touch_move(&mut self, event: TouchEvent) -> Vec<Gesture> {
        if !self.touches.contains_key(&event.id) {
            return Vec::new();
        }
        self.touches.insert(event.id, event.position);

        match self.phase {
            Phase::Pressed { id, start, .. } if id == event.id => {
                if (event.position - start).hypot() > self.config.tap_slop {
                    self.phase = Phase::Dragging { id, start };
                    vec![Gesture::DragChanged {
                        start,
                        translation: event.position - start,
                    }]
                } else {
                    Vec::new()
                }
            }
            Phase::Dragging { id, start } if id == event.id => vec![Gesture::DragChanged {
                start,
                translation: event.position - start,
            }],
            Phase::Pinching {
                ids,
                initial_distance,
            } if ids.contains(&event.id) => self
                .pinch_scale(ids, initial_distance)
                .map(|scale| vec![Gesture::PinchChanged { scale }])
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn touch_end(&mut self, event: TouchEvent) -> Vec<Gesture> {
        if !self.touches.contains_key(&event.id) {
            return Vec::new();
        }
        self.touches.insert(event.id, event.position);

        let gestures = match self.phase {
            Phase::Pressed {
                id,
                start,
                start_ms,
            } if id == event.id => {
                self.phase = Phase::Idle;
                if event.timestamp_ms.saturating_sub(start_ms) <= self.config.tap_max_ms {
                    vec![self.recognize_tap(start, event.timestamp_ms)]
                } else {
                    Vec::new()
                }
            }
            Phase::Dragging { id, start } if id == event.id => {
                self.phase = Phase::Idle;
                vec![Gesture::DragEnded {
                    start,
                    translation: event.position - start,
                }]
            }
            Phase::Pinching {
                ids,
                initial_distance,
            } if ids.contains(&event.id) => {
                let scale = self.pinch_scale(ids, initial_distance).unwrap_or(1.0);
                self.phase = Phase::Draining;
                vec![Gesture::PinchEnded { scale }]
            }
            _ => Vec::new(),
        };

        self.touches.remove(&event.id);
        if self.touches.is_empty() {
            self.phase = Phase::Idle;
        }
        gestures
    }

    fn touch_cancel(&mut self, event: TouchEvent) -> Vec<Gesture> {
        if self.touches.remove(&event.id).is_none() {
            return Vec::new();
        }
        let gestures = match self.phase {
            Phase::Dragging { .. } | Phase::Pinching { .. } => vec![Gesture::Cancelled],
            _ => Vec::new(),
        };
        self.phase = if self.touches.is_empty() {
            Phase::Idle
        } else {
            Phase::Draining
        };
        gestures
    }

    /// A tap landed; decide whether it completes a double tap.
    fn recognize_tap(&mut self, position: Point, now_ms: u64) -> Gesture {
        if let Some((last_ms, last_position)) = self.last_tap {
            let elapsed = now_ms.saturating_sub(last_ms);
            let distance = (position - last_position).hypot();
            if elapsed <= self.config.double_tap_ms && distance <= self.config.double_tap_distance {
                // Reset so a third tap starts a new sequence
                self.last_tap = None;
                return Gesture::DoubleTap { position };
            }
        }
        self.last_tap = Some((now_ms, position));
        Gesture::Tap { position }
    }

    fn distance(&self, a: u64, b: u64) -> Option<f64> {
        let pa = self.touches.get(&a)?;
        let pb = self.touches.get(&b)?;
        Some((*pa - *pb).hypot())
    }

    fn pinch_scale(&self, ids: [u64; 2], initial_distance: f64) -> Option<f64> {
        if initial_distance <= 0.0 {
            return None;
        }
        self.distance(ids[0], ids[1]).map(|d| d / initial_distance)
    }
}
