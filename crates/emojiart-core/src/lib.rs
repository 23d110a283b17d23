//! EmojiArt Core Library
//!
//! Platform-agnostic document, view and gesture logic for the EmojiArt canvas.

pub mod background;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod document;
pub mod drop;
pub mod error;
pub mod fetch;
pub mod gesture;
pub mod glyph;
pub mod input;
pub mod palette;
pub mod scene;
pub mod selection;

pub use background::{Background, BackgroundImage, BackgroundStatus, ImageFormat};
pub use camera::Camera;
pub use canvas::{DELETE_HANDLE_RADIUS, DropOutcome, EmojiArtCanvas};
pub use config::{CanvasConfig, DEFAULT_EMOJI_FONT_SIZE};
pub use document::{DocumentEvent, Emoji, EmojiArtDocument, EmojiArtModel, EmojiId, LogicalPoint, SubscriptionId};
pub use drop::{DropAction, DropPayload};
pub use error::{EmojiArtError, EmojiArtResult};
pub use fetch::{FetchCompletion, FetchRequest, FetchTicket, ImageFetcher};
#[cfg(not(target_arch = "wasm32"))]
pub use fetch::{DEFAULT_FETCH_TIMEOUT_SECS, HttpFetcher};
pub use gesture::{DragTarget, DragTracker, MagnifyMode, MagnifyTracker};
pub use input::{Gesture, GestureRecognizer, RecognizerConfig, TouchEvent, TouchPhase};
pub use palette::Palette;
pub use scene::{BackgroundPlacement, RenderedEmoji, Scene};
pub use selection::Selection;
