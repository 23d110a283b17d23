//! Per-gesture trackers.
//!
//! Each tracker is idle until its gesture begins, follows every update while
//! the gesture is live, and hands back the final value exactly once on
//! release. Cancelling drops the live value.

use kurbo::Vec2;

/// What a drag acts on, fixed when the drag begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// Pan the view.
    Canvas,
    /// Move every selected emoji.
    Selection,
}

/// Tracks a single-finger drag.
#[derive(Debug, Clone, Default)]
pub enum DragTracker {
    #[default]
    Idle,
    Active { target: DragTarget, translation: Vec2 },
}

impl DragTracker {
    pub fn begin(&mut self, target: DragTarget) {
        *self = DragTracker::Active {
            target,
            translation: Vec2::ZERO,
        };
    }

    /// Record the latest translation. Returns the target, or None if idle.
    pub fn update(&mut self, latest: Vec2) -> Option<DragTarget> {
        match self {
            DragTracker::Active { target, translation } => {
                *translation = latest;
                Some(*target)
            }
            DragTracker::Idle => None,
        }
    }

    /// End the drag, yielding its target and final translation.
    pub fn finish(&mut self, final_translation: Vec2) -> Option<(DragTarget, Vec2)> {
        match std::mem::take(self) {
            DragTracker::Active { target, .. } => Some((target, final_translation)),
            DragTracker::Idle => None,
        }
    }

    /// Abandon the drag. Returns the target it had, if any.
    pub fn cancel(&mut self) -> Option<DragTarget> {
        match std::mem::take(self) {
            DragTracker::Active { target, .. } => Some(target),
            DragTracker::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DragTracker::Active { .. })
    }

    /// Live translation if the drag is moving the selection.
    pub fn selection_offset(&self) -> Vec2 {
        match self {
            DragTracker::Active {
                target: DragTarget::Selection,
                translation,
            } => *translation,
            _ => Vec2::ZERO,
        }
    }
}

/// What a pinch acts on, fixed when the pinch begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnifyMode {
    /// Nothing selected: zoom the view.
    Zoom,
    /// Something selected: shrink the selected emoji.
    Resize,
}

/// Tracks a two-finger pinch.
#[derive(Debug, Clone, Default)]
pub enum MagnifyTracker {
    #[default]
    Idle,
    Active { mode: MagnifyMode, scale: f64 },
}

impl MagnifyTracker {
    pub fn begin(&mut self, mode: MagnifyMode) {
        *self = MagnifyTracker::Active { mode, scale: 1.0 };
    }

    /// Record the latest scale. Non-finite or non-positive scales are ignored.
    pub fn update(&mut self, latest: f64) -> Option<MagnifyMode> {
        match self {
            MagnifyTracker::Active { mode, scale } => {
                if latest.is_finite() && latest > 0.0 {
                    *scale = latest;
                }
                Some(*mode)
            }
            MagnifyTracker::Idle => None,
        }
    }

    /// End the pinch, yielding its mode and the factor to commit.
    pub fn finish(&mut self, final_scale: f64) -> Option<(MagnifyMode, f64)> {
        self.update(final_scale);
        match std::mem::take(self) {
            active @ MagnifyTracker::Active { mode, .. } => Some((mode, active.effective_scale())),
            MagnifyTracker::Idle => None,
        }
    }

    pub fn cancel(&mut self) -> Option<MagnifyMode> {
        match std::mem::take(self) {
            MagnifyTracker::Active { mode, .. } => Some(mode),
            MagnifyTracker::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, MagnifyTracker::Active { .. })
    }

    pub fn mode(&self) -> Option<MagnifyMode> {
        match self {
            MagnifyTracker::Active { mode, .. } => Some(*mode),
            MagnifyTracker::Idle => None,
        }
    }

    /// The factor this pinch applies right now.
    ///
    /// Resizing only shrinks: factors above 1 are clamped to 1.
    pub fn effective_scale(&self) -> f64 {
        match self {
            MagnifyTracker::Active {
                mode: MagnifyMode::Zoom,
                scale,
            } => *scale,
            MagnifyTracker::Active {
                mode: MagnifyMode::Resize,
                scale,
            } => scale.min(1.0),
            MagnifyTracker::Idle => 1.0,
        }
    }

    /// Live resize factor (1 unless resizing).
    pub fn resize_scale(&self) -> f64 {
        match self.mode() {
            Some(MagnifyMode::Resize) => self.effective_scale(),
            _ => 1.0,
        }
    }
}
