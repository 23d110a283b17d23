//! The EmojiArt document: placed emoji, the background, and change notification.

use crate::background::{Background, BackgroundImage, BackgroundStatus};
use crate::fetch::{FetchCompletion, FetchRequest, FetchTicket};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Stable identifier of a placed emoji.
pub type EmojiId = Uuid;

/// A point in document space. Integer units, origin at the viewport center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LogicalPoint {
    pub x: i32,
    pub y: i32,
}

impl LogicalPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// As a floating point kurbo point.
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

/// An emoji placed on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    id: EmojiId,
    text: String,
    position: LogicalPoint,
    size: i32,
}

impl Emoji {
    pub fn id(&self) -> EmojiId {
        self.id
    }

    /// The glyph (one grapheme cluster).
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> LogicalPoint {
        self.position
    }

    /// Font size in logical units.
    pub fn size(&self) -> i32 {
        self.size
    }
}

/// Plain document data: what would be saved if documents were saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmojiArtModel {
    pub background: Background,
    emojis: Vec<Emoji>,
}

impl EmojiArtModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emoji in placement order (back to front).
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    fn add_emoji(&mut self, text: &str, at: LogicalPoint, size: i32) -> EmojiId {
        let id = Uuid::new_v4();
        self.emojis.push(Emoji {
            id,
            text: text.to_string(),
            position: at,
            size,
        });
        id
    }

    fn remove_emoji(&mut self, id: EmojiId) -> Option<Emoji> {
        let index = self.emojis.iter().position(|e| e.id == id)?;
        Some(self.emojis.remove(index))
    }

    fn emoji_mut(&mut self, id: EmojiId) -> Option<&mut Emoji> {
        self.emojis.iter_mut().find(|e| e.id == id)
    }
}

/// A change reported to document observers.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    EmojiAdded(EmojiId),
    EmojiRemoved(EmojiId),
    EmojiMoved(EmojiId),
    EmojiScaled(EmojiId),
    /// The background reference or its load status changed.
    BackgroundChanged,
}

/// Handle returned by [`EmojiArtDocument::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&DocumentEvent)>;

/// Observable document.
///
/// Every mutator notifies subscribers after the change is applied. Observers
/// receive events only; they never own the document, so views hold it by
/// borrowing for the duration of a call.
pub struct EmojiArtDocument {
    model: EmojiArtModel,
    status: BackgroundStatus,
    /// The fetch the document is currently waiting on.
    pending_fetch: Option<FetchTicket>,
    next_ticket: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl std::fmt::Debug for EmojiArtDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmojiArtDocument")
            .field("model", &self.model)
            .field("status", &self.status)
            .field("pending_fetch", &self.pending_fetch)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for EmojiArtDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiArtDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            model: EmojiArtModel::new(),
            status: BackgroundStatus::None,
            pending_fetch: None,
            next_ticket: 1,
            observers: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn model(&self) -> &EmojiArtModel {
        &self.model
    }

    /// Emoji in placement order (back to front).
    pub fn emojis(&self) -> &[Emoji] {
        self.model.emojis()
    }

    /// Get an emoji by ID.
    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.model.emojis.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EmojiId) -> bool {
        self.emoji(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.model.emojis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.emojis.is_empty()
    }

    pub fn background(&self) -> &Background {
        &self.model.background
    }

    pub fn background_status(&self) -> &BackgroundStatus {
        &self.status
    }

    /// The resolved background image, if any.
    pub fn background_image(&self) -> Option<&BackgroundImage> {
        self.status.image()
    }

    /// Register an observer; it is called after every change.
    pub fn subscribe(&mut self, observer: impl FnMut(&DocumentEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: DocumentEvent) {
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    /// Place an emoji. `size` is truncated to whole logical units.
    pub fn add_emoji(&mut self, text: &str, at: LogicalPoint, size: f64) -> EmojiId {
        let id = self.model.add_emoji(text, at, size as i32);
        log::debug!("Added emoji {} at ({}, {}) size {}", text, at.x, at.y, size as i32);
        self.notify(DocumentEvent::EmojiAdded(id));
        id
    }

    /// Remove an emoji. Returns the removed emoji, or None if the id is unknown.
    pub fn remove_emoji(&mut self, id: EmojiId) -> Option<Emoji> {
        let removed = self.model.remove_emoji(id)?;
        self.notify(DocumentEvent::EmojiRemoved(id));
        Some(removed)
    }

    /// Move an emoji by a logical offset. Each component is truncated toward zero
    /// and the result saturates at the edges of the logical plane.
    pub fn move_emoji(&mut self, id: EmojiId, offset: Vec2) -> bool {
        let Some(emoji) = self.model.emoji_mut(id) else {
            return false;
        };
        emoji.position.x = emoji.position.x.saturating_add(offset.x as i32);
        emoji.position.y = emoji.position.y.saturating_add(offset.y as i32);
        self.notify(DocumentEvent::EmojiMoved(id));
        true
    }

    /// Scale an emoji's size, rounding half away from zero. Saturates at `i32::MAX`.
    pub fn scale_emoji(&mut self, id: EmojiId, scale: f64) -> bool {
        let Some(emoji) = self.model.emoji_mut(id) else {
            return false;
        };
        emoji.size = (f64::from(emoji.size) * scale).round() as i32;
        self.notify(DocumentEvent::EmojiScaled(id));
        true
    }

    /// Replace the background.
    ///
    /// A URL background starts a fetch: the status becomes `Fetching` and the
    /// returned request must be handed to a fetcher. Its completion goes back
    /// through [`complete_fetch`](Self::complete_fetch).
    pub fn set_background(&mut self, background: Background) -> Option<FetchRequest> {
        self.model.background = background;
        self.pending_fetch = None;

        let request = match &self.model.background {
            Background::Blank => {
                self.status = BackgroundStatus::None;
                None
            }
            Background::Url(url) => {
                let ticket = FetchTicket::new(self.next_ticket);
                self.next_ticket += 1;
                self.pending_fetch = Some(ticket);
                self.status = BackgroundStatus::Fetching(url.clone());
                log::info!("Fetching background {}", url);
                Some(FetchRequest {
                    ticket,
                    url: url.clone(),
                })
            }
            Background::ImageData(data) => {
                match BackgroundImage::decode(data.clone()) {
                    Ok(image) => self.status = BackgroundStatus::Resolved(image),
                    Err(e) => {
                        log::warn!("Background image data could not be decoded: {}", e);
                        self.status = BackgroundStatus::None;
                    }
                }
                None
            }
        };

        self.notify(DocumentEvent::BackgroundChanged);
        request
    }

    /// Start fetching a background from a URL.
    pub fn set_background_url(&mut self, url: Url) -> Option<FetchRequest> {
        self.set_background(Background::Url(url))
    }

    /// Use an already decoded image as the background.
    pub fn set_background_image(&mut self, image: BackgroundImage) {
        self.model.background = Background::ImageData(image.data().to_vec());
        self.pending_fetch = None;
        self.status = BackgroundStatus::Resolved(image);
        self.notify(DocumentEvent::BackgroundChanged);
    }

    /// Apply the outcome of a background fetch.
    ///
    /// Completions for anything other than the pending fetch are stale and
    /// ignored. A failed fetch leaves the status at `Fetching`; setting the
    /// background again retries. Returns true if the status changed.
    pub fn complete_fetch(&mut self, completion: FetchCompletion) -> bool {
        if self.pending_fetch != Some(completion.ticket) {
            log::debug!("Ignoring stale fetch of {}", completion.url);
            return false;
        }
        self.pending_fetch = None;

        let image = completion.result.and_then(BackgroundImage::decode);
        match image {
            Ok(image) => {
                log::info!(
                    "Background {} resolved ({}x{})",
                    completion.url,
                    image.width(),
                    image.height()
                );
                self.status = BackgroundStatus::Resolved(image);
                self.notify(DocumentEvent::BackgroundChanged);
                true
            }
            Err(e) => {
                log::warn!("Background fetch of {} failed: {}", completion.url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::test_images;
    use crate::error::EmojiArtError;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_document_creation() {
        let doc = EmojiArtDocument::new();
        assert!(doc.is_empty());
        assert_eq!(doc.background(), &Background::Blank);
        assert_eq!(doc.background_status(), &BackgroundStatus::None);
    }

    #[test]
    fn test_add_emoji_truncates_size() {
        let mut doc = EmojiArtDocument::new();
        let id = doc.add_emoji("🔥", LogicalPoint::new(3, -4), 13.9);

        let emoji = doc.emoji(id).unwrap();
        assert_eq!(emoji.text(), "🔥");
        assert_eq!(emoji.position(), LogicalPoint::new(3, -4));
        assert_eq!(emoji.size(), 13);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_remove_emoji() {
        let mut doc = EmojiArtDocument::new();
        let id = doc.add_emoji("🍎", LogicalPoint::default(), 40.0);

        assert!(doc.remove_emoji(id).is_some());
        assert!(doc.is_empty());
        assert!(doc.remove_emoji(id).is_none());
    }

    #[test]
    fn test_move_emoji_truncates_offset() {
        let mut doc = EmojiArtDocument::new();
        let id = doc.add_emoji("🚀", LogicalPoint::new(10, 10), 40.0);

        assert!(doc.move_emoji(id, Vec2::new(5.7, -2.5)));
        assert_eq!(doc.emoji(id).unwrap().position(), LogicalPoint::new(15, 8));
        assert!(!doc.move_emoji(Uuid::new_v4(), Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_move_emoji_saturates() {
        let mut doc = EmojiArtDocument::new();
        let id = doc.add_emoji("🛸", LogicalPoint::new(i32::MAX - 1, i32::MIN + 1), 40.0);

        assert!(doc.move_emoji(id, Vec2::new(10.0, -10.0)));
        assert_eq!(doc.emoji(id).unwrap().position(), LogicalPoint::new(i32::MAX, i32::MIN));

        // Offsets beyond the i32 range saturate before adding
        assert!(doc.move_emoji(id, Vec2::new(1e12, 1e12)));
        assert_eq!(doc.emoji(id).unwrap().position(), LogicalPoint::new(i32::MAX, -1));
    }

    #[test]
    fn test_scale_emoji_rounds() {
        let mut doc = EmojiArtDocument::new();
        let id = doc.add_emoji("🚗", LogicalPoint::default(), 40.0);

        assert!(doc.scale_emoji(id, 0.5));
        assert_eq!(doc.emoji(id).unwrap().size(), 20);

        // 20 * 0.525 = 10.5 rounds away from zero
        doc.scale_emoji(id, 0.525);
        assert_eq!(doc.emoji(id).unwrap().size(), 11);
    }

    #[test]
    fn test_observers_see_every_change() {
        let mut doc = EmojiArtDocument::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        doc.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let id = doc.add_emoji("🌞", LogicalPoint::default(), 40.0);
        doc.move_emoji(id, Vec2::new(1.0, 1.0));
        doc.scale_emoji(id, 0.5);
        doc.remove_emoji(id);
        doc.set_background(Background::Blank);

        assert_eq!(
            *events.borrow(),
            vec![
                DocumentEvent::EmojiAdded(id),
                DocumentEvent::EmojiMoved(id),
                DocumentEvent::EmojiScaled(id),
                DocumentEvent::EmojiRemoved(id),
                DocumentEvent::BackgroundChanged,
            ]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let mut doc = EmojiArtDocument::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let sub = doc.subscribe(move |_| *sink.borrow_mut() += 1);

        doc.add_emoji("🌲", LogicalPoint::default(), 40.0);
        assert!(doc.unsubscribe(sub));
        assert!(!doc.unsubscribe(sub));
        doc.add_emoji("🌲", LogicalPoint::default(), 40.0);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_url_background_starts_fetch() {
        let mut doc = EmojiArtDocument::new();
        let request = doc.set_background_url(url("https://cdn.example.com/a.png")).unwrap();

        assert_eq!(request.url.as_str(), "https://cdn.example.com/a.png");
        assert!(doc.background_status().is_fetching());
    }

    #[test]
    fn test_fetch_success_resolves() {
        let mut doc = EmojiArtDocument::new();
        let request = doc.set_background_url(url("https://cdn.example.com/a.png")).unwrap();

        let changed = doc.complete_fetch(request.complete(Ok(test_images::png(20, 10))));
        assert!(changed);
        let image = doc.background_image().unwrap();
        assert_eq!((image.width(), image.height()), (20, 10));
    }

    #[test]
    fn test_fetch_failure_stays_fetching() {
        let mut doc = EmojiArtDocument::new();
        let request = doc.set_background_url(url("https://cdn.example.com/a.png")).unwrap();

        let changed = doc.complete_fetch(request.complete(Err(EmojiArtError::Fetch("404".into()))));
        assert!(!changed);
        assert!(doc.background_status().is_fetching());
    }

    #[test]
    fn test_undecodable_fetch_stays_fetching() {
        let mut doc = EmojiArtDocument::new();
        let request = doc.set_background_url(url("https://cdn.example.com/a.png")).unwrap();

        assert!(!doc.complete_fetch(request.complete(Ok(b"<html>".to_vec()))));
        assert!(doc.background_status().is_fetching());
    }

    #[test]
    fn test_stale_fetch_is_ignored() {
        let mut doc = EmojiArtDocument::new();
        let first = doc.set_background_url(url("https://cdn.example.com/a.png")).unwrap();
        let second = doc.set_background_url(url("https://cdn.example.com/b.png")).unwrap();

        assert!(!doc.complete_fetch(first.complete(Ok(test_images::png(5, 5)))));
        assert_eq!(
            doc.background_status(),
            &BackgroundStatus::Fetching(url("https://cdn.example.com/b.png"))
        );

        assert!(doc.complete_fetch(second.complete(Ok(test_images::png(7, 7)))));
        assert_eq!(doc.background_image().unwrap().width(), 7);
    }

    #[test]
    fn test_fetch_after_background_cleared_is_ignored() {
        let mut doc = EmojiArtDocument::new();
        let request = doc.set_background_url(url("https://cdn.example.com/a.png")).unwrap();
        doc.set_background(Background::Blank);

        assert!(!doc.complete_fetch(request.complete(Ok(test_images::png(5, 5)))));
        assert_eq!(doc.background_status(), &BackgroundStatus::None);
    }

    #[test]
    fn test_image_data_background_resolves_immediately() {
        let mut doc = EmojiArtDocument::new();
        assert!(doc.set_background(Background::ImageData(test_images::png(4, 3))).is_none());
        assert_eq!(doc.background_image().unwrap().height(), 3);

        doc.set_background(Background::ImageData(b"junk".to_vec()));
        assert_eq!(doc.background_status(), &BackgroundStatus::None);
    }
}
