//! Camera module for pan/zoom transforms.
//!
//! Screen space is the viewport in pixels. Logical space is the document's
//! integer coordinate system, with its origin at the viewport center.

use crate::document::LogicalPoint;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Values closer than this to an integer are treated as that integer
/// when converting back to logical units.
const SNAP_EPSILON: f64 = 1e-9;

/// Map a logical point to screen coordinates.
///
/// `pan` is the effective pan offset in screen units, `center` the viewport center.
pub fn to_screen(logical: LogicalPoint, pan: Vec2, zoom: f64, center: Point) -> Point {
    Point::new(
        center.x + f64::from(logical.x) * zoom + pan.x,
        center.y + f64::from(logical.y) * zoom + pan.y,
    )
}

/// Map a screen point back to logical coordinates, truncating toward zero.
pub fn to_logical(screen: Point, pan: Vec2, zoom: f64, center: Point) -> LogicalPoint {
    LogicalPoint::new(
        truncate_logical((screen.x - pan.x - center.x) / zoom),
        truncate_logical((screen.y - pan.y - center.y) / zoom),
    )
}

/// Truncate toward zero, snapping float noise first so integer points round-trip.
fn truncate_logical(value: f64) -> i32 {
    let nearest = value.round();
    if (value - nearest).abs() < SNAP_EPSILON {
        nearest as i32
    } else {
        value.trunc() as i32
    }
}

/// Camera manages the view transform for the canvas.
///
/// Pan and zoom each have a steady (committed) part and a gesture part that
/// is only live while a drag or pinch is in flight. The pan is stored in
/// logical units so that zooming scales it along with the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    steady_pan: Vec2,
    gesture_pan: Vec2,
    steady_zoom: f64,
    gesture_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            steady_pan: Vec2::ZERO,
            gesture_pan: Vec2::ZERO,
            steady_zoom: 1.0,
            gesture_zoom: 1.0,
        }
    }
}

impl Camera {
    /// Create a new camera with no pan and unit zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective zoom scale (steady × gesture).
    pub fn zoom(&self) -> f64 {
        self.steady_zoom * self.gesture_zoom
    }

    /// Committed zoom scale, ignoring any live pinch.
    pub fn steady_zoom(&self) -> f64 {
        self.steady_zoom
    }

    /// Effective pan offset in screen units.
    pub fn pan_offset(&self) -> Vec2 {
        (self.steady_pan + self.gesture_pan) * self.zoom()
    }

    /// Committed pan offset in logical units.
    pub fn steady_pan(&self) -> Vec2 {
        self.steady_pan
    }

    /// Get the affine transform from logical to screen coordinates.
    pub fn transform(&self, center: Point) -> Affine {
        Affine::translate(center.to_vec2() + self.pan_offset()) * Affine::scale(self.zoom())
    }

    /// Convert a logical point to screen coordinates.
    pub fn logical_to_screen(&self, logical: LogicalPoint, center: Point) -> Point {
        to_screen(logical, self.pan_offset(), self.zoom(), center)
    }

    /// Convert a screen point to logical coordinates.
    pub fn screen_to_logical(&self, screen: Point, center: Point) -> LogicalPoint {
        to_logical(screen, self.pan_offset(), self.zoom(), center)
    }

    /// Convert a screen-space distance to logical units.
    pub fn screen_delta_to_logical(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom()
    }

    /// Update the live pan from a drag translation in screen units.
    pub fn set_gesture_pan(&mut self, translation: Vec2) {
        self.gesture_pan = translation / self.zoom();
    }

    /// Fold a finished drag translation into the steady pan.
    pub fn commit_pan(&mut self, translation: Vec2) {
        self.steady_pan += translation / self.zoom();
        self.gesture_pan = Vec2::ZERO;
    }

    /// Drop the live pan without committing it.
    pub fn cancel_pan(&mut self) {
        self.gesture_pan = Vec2::ZERO;
    }

    /// Update the live zoom from a pinch scale.
    pub fn set_gesture_zoom(&mut self, scale: f64) {
        self.gesture_zoom = scale;
    }

    /// Fold a finished pinch scale into the steady zoom.
    pub fn commit_zoom(&mut self, scale: f64) {
        self.steady_zoom *= scale;
        self.gesture_zoom = 1.0;
    }

    /// Drop the live zoom without committing it.
    pub fn cancel_zoom(&mut self) {
        self.gesture_zoom = 1.0;
    }

    /// Fit an image of `image` size into `viewport`: zoom becomes the smaller
    /// of the two axis ratios and the pan resets to zero.
    ///
    /// Returns `false` and leaves the camera untouched when either size is degenerate.
    pub fn zoom_to_fit(&mut self, image: Size, viewport: Size) -> bool {
        if image.width <= 0.0 || image.height <= 0.0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
            return false;
        }
        let h_zoom = viewport.width / image.width;
        let v_zoom = viewport.height / image.height;
        self.steady_pan = Vec2::ZERO;
        self.gesture_pan = Vec2::ZERO;
        self.steady_zoom = h_zoom.min(v_zoom);
        self.gesture_zoom = 1.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.pan_offset(), Vec2::ZERO);
        assert!((camera.zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_screen_identity_at_origin() {
        let p = to_screen(LogicalPoint::new(10, -20), Vec2::ZERO, 1.0, Point::ZERO);
        assert!((p.x - 10.0).abs() < f64::EPSILON);
        assert!((p.y + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_screen_with_center_pan_zoom() {
        let p = to_screen(
            LogicalPoint::new(10, 20),
            Vec2::new(5.0, -5.0),
            2.0,
            Point::new(200.0, 100.0),
        );
        assert!((p.x - 225.0).abs() < f64::EPSILON);
        assert!((p.y - 135.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_logical_truncates_toward_zero() {
        let center = Point::ZERO;
        assert_eq!(
            to_logical(Point::new(10.9, -10.9), Vec2::ZERO, 1.0, center),
            LogicalPoint::new(10, -10)
        );
    }

    #[test]
    fn test_roundtrip_conversion() {
        let pans = [Vec2::ZERO, Vec2::new(30.0, -20.0), Vec2::new(-7.25, 13.5)];
        let zooms = [0.3, 1.0, 1.5, 2.0, 3.7];
        let center = Point::new(160.0, 240.0);

        for &pan in &pans {
            for &zoom in &zooms {
                for &(x, y) in &[(0, 0), (123, 456), (-17, 9), (1000, -1000)] {
                    let original = LogicalPoint::new(x, y);
                    let screen = to_screen(original, pan, zoom, center);
                    let back = to_logical(screen, pan, zoom, center);
                    assert_eq!(back, original, "pan={pan:?} zoom={zoom}");
                }
            }
        }
    }

    #[test]
    fn test_camera_transform_matches_to_screen() {
        let mut camera = Camera::new();
        camera.commit_pan(Vec2::new(40.0, 10.0));
        camera.commit_zoom(2.0);
        let center = Point::new(100.0, 100.0);
        let logical = LogicalPoint::new(3, 4);

        let via_affine = camera.transform(center) * logical.to_point();
        let direct = camera.logical_to_screen(logical, center);
        assert!((via_affine.x - direct.x).abs() < 1e-10);
        assert!((via_affine.y - direct.y).abs() < 1e-10);
    }

    #[test]
    fn test_pan_is_scaled_by_zoom() {
        let mut camera = Camera::new();
        camera.commit_pan(Vec2::new(10.0, 20.0));
        assert!((camera.pan_offset().x - 10.0).abs() < f64::EPSILON);

        camera.commit_zoom(2.0);
        // Pan is stored in logical units, so it doubles on screen
        assert!((camera.pan_offset().x - 20.0).abs() < f64::EPSILON);
        assert!((camera.pan_offset().y - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gesture_pan_commit_and_cancel() {
        let mut camera = Camera::new();
        camera.commit_zoom(2.0);

        camera.set_gesture_pan(Vec2::new(50.0, 0.0));
        assert!((camera.pan_offset().x - 50.0).abs() < f64::EPSILON);
        assert_eq!(camera.steady_pan(), Vec2::ZERO);

        camera.cancel_pan();
        assert_eq!(camera.pan_offset(), Vec2::ZERO);

        camera.set_gesture_pan(Vec2::new(50.0, 0.0));
        camera.commit_pan(Vec2::new(50.0, 0.0));
        assert!((camera.steady_pan().x - 25.0).abs() < f64::EPSILON);
        assert!((camera.pan_offset().x - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gesture_zoom_commit_and_cancel() {
        let mut camera = Camera::new();
        camera.set_gesture_zoom(3.0);
        assert!((camera.zoom() - 3.0).abs() < f64::EPSILON);
        assert!((camera.steady_zoom() - 1.0).abs() < f64::EPSILON);

        camera.cancel_zoom();
        assert!((camera.zoom() - 1.0).abs() < f64::EPSILON);

        camera.commit_zoom(2.0);
        camera.commit_zoom(2.0);
        assert!((camera.zoom() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_to_fit() {
        let mut camera = Camera::new();
        camera.commit_pan(Vec2::new(30.0, 30.0));

        assert!(camera.zoom_to_fit(Size::new(200.0, 100.0), Size::new(400.0, 400.0)));
        assert!((camera.zoom() - 2.0).abs() < f64::EPSILON);
        assert_eq!(camera.pan_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_zoom_to_fit_degenerate_is_noop() {
        let mut camera = Camera::new();
        camera.commit_zoom(1.5);

        assert!(!camera.zoom_to_fit(Size::new(200.0, 100.0), Size::ZERO));
        assert!(!camera.zoom_to_fit(Size::new(0.0, 100.0), Size::new(400.0, 400.0)));
        assert!((camera.zoom() - 1.5).abs() < f64::EPSILON);
    }
}
