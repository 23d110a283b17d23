//! The emoji palette.

use crate::glyph::emoji_glyphs;

/// Glyphs offered when no palette is configured.
pub const DEFAULT_PALETTE: &str = "😀😷🦠💉👻👀🐶🌲🌎🌞🔥🍎⚽️🚗🚓🚲🛩🚁🚀🛸🏠⌚️🎁🗝🔐❤️⛔️❌❓✅⚠️🎶➕➖🏳️";

/// A row of emoji the user can drag onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    glyphs: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE)
    }
}

impl Palette {
    /// Build a palette from a string; anything that is not an emoji is skipped.
    pub fn new(emojis: &str) -> Self {
        Self {
            glyphs: emoji_glyphs(emojis),
        }
    }

    pub fn glyphs(&self) -> &[String] {
        &self.glyphs
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.glyphs.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.get(0), Some("😀"));
        assert_eq!(palette.get(10), Some("🔥"));
        assert!(palette.glyphs().iter().any(|g| g == "⚽️"));
        assert_eq!(palette.glyphs().last().map(String::as_str), Some("🏳️"));
    }

    #[test]
    fn test_non_emoji_skipped() {
        let palette = Palette::new("a🍎 b🚀");
        assert_eq!(palette.glyphs(), &["🍎".to_string(), "🚀".to_string()]);
        assert!(Palette::new("abc").is_empty());
    }
}
