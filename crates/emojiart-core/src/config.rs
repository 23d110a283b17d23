//! Canvas configuration.

use crate::error::EmojiArtResult;
use crate::input::RecognizerConfig;
use crate::palette::DEFAULT_PALETTE;
use serde::{Deserialize, Serialize};

/// Font size, in screen points, of a newly dropped emoji.
pub const DEFAULT_EMOJI_FONT_SIZE: f64 = 40.0;

/// Settings for an [`EmojiArtCanvas`](crate::EmojiArtCanvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// On-screen size of a dropped emoji; its logical size is this divided by the zoom.
    pub default_emoji_font_size: f64,
    /// Glyphs offered by the palette.
    pub palette: String,
    pub recognizer: RecognizerConfig,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_emoji_font_size: DEFAULT_EMOJI_FONT_SIZE,
            palette: DEFAULT_PALETTE.to_string(),
            recognizer: RecognizerConfig::default(),
        }
    }
}

impl CanvasConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> EmojiArtResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
