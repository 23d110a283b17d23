//! Error types for EmojiArt operations.

use thiserror::Error;

/// Errors raised by fallible helpers. The canvas absorbs all of these
/// (logs and ignores), so none of them surface to the user.
#[derive(Debug, Error)]
pub enum EmojiArtError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for EmojiArt operations.
pub type EmojiArtResult<T> = Result<T, EmojiArtError>;
