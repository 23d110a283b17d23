//! Canvas view state and gesture handling.
//!
//! [`EmojiArtCanvas`] is the view over an [`EmojiArtDocument`]: it owns the
//! camera, the selection and the live gesture trackers, and turns gestures
//! into document mutations. The document is borrowed per call.

use crate::camera::Camera;
use crate::config::CanvasConfig;
use crate::document::{DocumentEvent, EmojiArtDocument, EmojiId, SubscriptionId};
use crate::drop::{DropAction, DropPayload, resolve_drop};
use crate::fetch::FetchRequest;
use crate::gesture::{DragTarget, DragTracker, MagnifyMode, MagnifyTracker};
use crate::input::{Gesture, GestureRecognizer, TouchEvent};
use crate::palette::Palette;
use crate::scene::{BackgroundPlacement, RenderedEmoji, Scene};
use crate::selection::Selection;
use kurbo::{Point, Size, Vec2};
use std::cell::RefCell;
use std::rc::Rc;

/// Screen radius around a delete button that still counts as pressing it.
pub const DELETE_HANDLE_RADIUS: f64 = 12.0;

/// Document changes seen by the canvas's subscription, drained on the next call.
#[derive(Debug, Default)]
struct DocumentChanges {
    dirty: bool,
    removed: Vec<EmojiId>,
}

/// Result of a drop on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DropOutcome {
    pub accepted: bool,
    /// Background fetch to start, when a URL was dropped.
    pub fetch: Option<FetchRequest>,
}

impl DropOutcome {
    fn accepted() -> Self {
        Self {
            accepted: true,
            fetch: None,
        }
    }
}

/// The canvas view.
#[derive(Debug)]
pub struct EmojiArtCanvas {
    pub camera: Camera,
    selection: Selection,
    drag: DragTracker,
    magnify: MagnifyTracker,
    recognizer: GestureRecognizer,
    palette: Palette,
    viewport: Size,
    config: CanvasConfig,
    /// View-only changes (pan, zoom, selection) since the last redraw.
    needs_redraw: bool,
    changes: Rc<RefCell<DocumentChanges>>,
}

impl Default for EmojiArtCanvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl EmojiArtCanvas {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            camera: Camera::new(),
            selection: Selection::new(),
            drag: DragTracker::default(),
            magnify: MagnifyTracker::default(),
            recognizer: GestureRecognizer::new(config.recognizer),
            palette: Palette::new(&config.palette),
            viewport: Size::ZERO,
            config,
            needs_redraw: true,
            changes: Rc::default(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Center of the viewport in screen coordinates; the logical origin maps here.
    pub fn viewport_center(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        if size != self.viewport {
            self.viewport = size;
            self.needs_redraw = true;
        }
    }

    /// Subscribe to the document so removals prune the selection and
    /// document changes schedule a redraw.
    pub fn observe(&self, document: &mut EmojiArtDocument) -> SubscriptionId {
        let changes = Rc::clone(&self.changes);
        document.subscribe(move |event| {
            let mut changes = changes.borrow_mut();
            changes.dirty = true;
            if let DocumentEvent::EmojiRemoved(id) = event {
                changes.removed.push(*id);
            }
        })
    }

    /// Apply document changes reported since the last call.
    fn sync(&mut self) {
        let mut changes = self.changes.borrow_mut();
        for id in changes.removed.drain(..) {
            self.selection.remove(id);
        }
        if changes.dirty {
            changes.dirty = false;
            self.needs_redraw = true;
        }
    }

    /// Whether anything visible changed since the last call. Resets the flag.
    pub fn take_needs_redraw(&mut self) -> bool {
        self.sync();
        std::mem::take(&mut self.needs_redraw)
    }

    /// Frontmost emoji whose rendered square contains `point`.
    pub fn emoji_at(&self, document: &EmojiArtDocument, point: Point) -> Option<EmojiId> {
        if document.background_status().is_fetching() {
            return None;
        }
        let center = self.viewport_center();
        let zoom = self.camera.zoom();
        document.emojis().iter().rev().find_map(|emoji| {
            let position = self.camera.logical_to_screen(emoji.position(), center);
            let half = f64::from(emoji.size()) * zoom / 2.0;
            let hit = (point.x - position.x).abs() <= half && (point.y - position.y).abs() <= half;
            hit.then_some(emoji.id())
        })
    }

    /// Selected emoji whose delete button is under `point`, frontmost first.
    pub fn delete_handle_at(&self, document: &EmojiArtDocument, point: Point) -> Option<EmojiId> {
        if document.background_status().is_fetching() {
            return None;
        }
        let center = self.viewport_center();
        let zoom = self.camera.zoom();
        document
            .emojis()
            .iter()
            .rev()
            .filter(|emoji| self.selection.contains(emoji.id()))
            .find_map(|emoji| {
                let half = f64::from(emoji.size()) * zoom / 2.0;
                let handle = self.camera.logical_to_screen(emoji.position(), center) + Vec2::new(half, -half);
                ((point - handle).hypot() <= DELETE_HANDLE_RADIUS).then_some(emoji.id())
            })
    }

    /// Tap: press a delete button, toggle the emoji under the finger, or
    /// clear the selection on empty canvas.
    pub fn tap(&mut self, document: &mut EmojiArtDocument, point: Point) {
        self.sync();
        if let Some(id) = self.delete_handle_at(document, point) {
            self.delete_emoji(document, id);
            return;
        }
        match self.emoji_at(document, point) {
            Some(id) => {
                let selected = self.selection.toggle(id);
                log::debug!("Emoji {} {}", id, if selected { "selected" } else { "deselected" });
            }
            None => self.selection.clear(),
        }
        self.needs_redraw = true;
    }

    /// Double tap: fit the background image into the viewport.
    pub fn double_tap(&mut self, document: &EmojiArtDocument) -> bool {
        let Some(image) = document.background_image() else {
            return false;
        };
        let fitted = self.camera.zoom_to_fit(image.size(), self.viewport);
        if fitted {
            log::debug!("Zoomed to fit: {:.3}", self.camera.zoom());
            self.needs_redraw = true;
        }
        fitted
    }

    fn begin_drag(&mut self, document: &EmojiArtDocument, start: Point) {
        let target = match self.emoji_at(document, start) {
            Some(id) if self.selection.contains(id) => DragTarget::Selection,
            _ => DragTarget::Canvas,
        };
        self.drag.begin(target);
    }

    pub fn drag_changed(&mut self, document: &EmojiArtDocument, start: Point, translation: Vec2) {
        self.sync();
        if !self.drag.is_active() {
            self.begin_drag(document, start);
        }
        if let Some(DragTarget::Canvas) = self.drag.update(translation) {
            self.camera.set_gesture_pan(translation);
        }
        self.needs_redraw = true;
    }

    /// Commit a drag: pan the view, or move every selected emoji.
    pub fn drag_ended(&mut self, document: &mut EmojiArtDocument, start: Point, translation: Vec2) {
        self.sync();
        if !self.drag.is_active() {
            self.begin_drag(document, start);
        }
        match self.drag.finish(translation) {
            Some((DragTarget::Canvas, translation)) => self.camera.commit_pan(translation),
            Some((DragTarget::Selection, translation)) => {
                let offset = self.camera.screen_delta_to_logical(translation);
                for id in self.selection.to_vec() {
                    document.move_emoji(id, offset);
                }
            }
            None => {}
        }
        self.needs_redraw = true;
    }

    pub fn pinch_changed(&mut self, scale: f64) {
        self.sync();
        if !self.magnify.is_active() {
            self.begin_pinch();
        }
        if let Some(MagnifyMode::Zoom) = self.magnify.update(scale) {
            self.camera.set_gesture_zoom(self.magnify.effective_scale());
        }
        self.needs_redraw = true;
    }

    /// Commit a pinch: zoom the view, or shrink the selected emoji.
    pub fn pinch_ended(&mut self, document: &mut EmojiArtDocument, scale: f64) {
        self.sync();
        if !self.magnify.is_active() {
            self.begin_pinch();
        }
        match self.magnify.finish(scale) {
            Some((MagnifyMode::Zoom, scale)) => self.camera.commit_zoom(scale),
            Some((MagnifyMode::Resize, scale)) => {
                if (scale - 1.0).abs() > f64::EPSILON {
                    for id in self.selection.to_vec() {
                        document.scale_emoji(id, scale);
                    }
                }
            }
            None => {}
        }
        self.needs_redraw = true;
    }

    fn begin_pinch(&mut self) {
        let mode = if self.selection.is_empty() {
            MagnifyMode::Zoom
        } else {
            MagnifyMode::Resize
        };
        self.magnify.begin(mode);
    }

    /// Discard every live gesture without committing it.
    pub fn cancel_gestures(&mut self) {
        if self.drag.cancel() == Some(DragTarget::Canvas) {
            self.camera.cancel_pan();
        }
        if self.magnify.cancel() == Some(MagnifyMode::Zoom) {
            self.camera.cancel_zoom();
        }
        self.needs_redraw = true;
    }

    /// Delete a selected emoji. Unselected emoji have no delete button and are left alone.
    pub fn delete_emoji(&mut self, document: &mut EmojiArtDocument, id: EmojiId) -> bool {
        self.sync();
        if !self.selection.contains(id) {
            log::debug!("Ignoring delete of unselected emoji {}", id);
            return false;
        }
        self.selection.remove(id);
        self.needs_redraw = true;
        document.remove_emoji(id).is_some()
    }

    /// Handle a drop at a screen location.
    pub fn drop_payloads(&mut self, document: &mut EmojiArtDocument, payloads: &[DropPayload], location: Point) -> DropOutcome {
        self.sync();
        let Some(action) = resolve_drop(payloads) else {
            log::debug!("Drop rejected: no acceptable payload");
            return DropOutcome::default();
        };
        self.needs_redraw = true;
        match action {
            DropAction::BackgroundUrl(url) => DropOutcome {
                accepted: true,
                fetch: document.set_background_url(url),
            },
            DropAction::BackgroundImage(image) => {
                document.set_background_image(image);
                DropOutcome::accepted()
            }
            DropAction::AddEmoji(text) => {
                let at = self.camera.screen_to_logical(location, self.viewport_center());
                let size = self.config.default_emoji_font_size / self.camera.zoom();
                document.add_emoji(&text, at, size);
                DropOutcome::accepted()
            }
        }
    }

    /// Drop the palette glyph at `index`. Returns false for an unknown index.
    pub fn palette_drop(&mut self, document: &mut EmojiArtDocument, index: usize, location: Point) -> bool {
        let Some(glyph) = self.palette.get(index) else {
            return false;
        };
        let payload = DropPayload::Text(glyph.to_string());
        self.drop_payloads(document, &[payload], location).accepted
    }

    /// Feed a raw touch through the recognizer and apply the resulting gestures.
    pub fn handle_touch(&mut self, document: &mut EmojiArtDocument, event: TouchEvent) {
        for gesture in self.recognizer.handle(event) {
            self.handle_gesture(document, gesture);
        }
    }

    pub fn handle_gesture(&mut self, document: &mut EmojiArtDocument, gesture: Gesture) {
        match gesture {
            Gesture::Tap { position } => self.tap(document, position),
            // Emoji only react to single taps, so a quick second tap toggles again
            Gesture::DoubleTap { position } => {
                if self.emoji_at(document, position).is_some() {
                    self.tap(document, position);
                } else {
                    self.double_tap(document);
                }
            }
            Gesture::DragChanged { start, translation } => self.drag_changed(document, start, translation),
            Gesture::DragEnded { start, translation } => self.drag_ended(document, start, translation),
            Gesture::PinchChanged { scale } => self.pinch_changed(scale),
            Gesture::PinchEnded { scale } => self.pinch_ended(document, scale),
            Gesture::Cancelled => self.cancel_gestures(),
        }
    }

    /// Build the render list for the current document and view state.
    pub fn scene(&self, document: &EmojiArtDocument) -> Scene {
        let center = self.viewport_center();
        let zoom = self.camera.zoom();
        let loading = document.background_status().is_fetching();

        let background = document.background_image().map(|image| BackgroundPlacement {
            center: center + self.camera.pan_offset(),
            scale: zoom,
            width: image.width(),
            height: image.height(),
        });

        let emojis = if loading {
            Vec::new()
        } else {
            document
                .emojis()
                .iter()
                .map(|emoji| {
                    let selected = self.selection.contains(emoji.id());
                    let mut position = self.camera.logical_to_screen(emoji.position(), center);
                    let mut size = f64::from(emoji.size());
                    if selected {
                        position += self.drag.selection_offset();
                        size = (size * self.magnify.resize_scale()).round();
                    }
                    let font_size = size * zoom;
                    RenderedEmoji {
                        id: emoji.id(),
                        text: emoji.text().to_string(),
                        position,
                        font_size,
                        selected,
                        delete_handle: selected
                            .then(|| position + Vec2::new(font_size / 2.0, -font_size / 2.0)),
                    }
                })
                .collect()
        };

        Scene {
            viewport: self.viewport,
            zoom,
            pan: self.camera.pan_offset(),
            background,
            loading,
            emojis,
        }
    }
}
