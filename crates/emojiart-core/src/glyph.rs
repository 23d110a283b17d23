//! Emoji glyph detection.

use unicode_segmentation::UnicodeSegmentation;

/// Scalars at or below this value with the Emoji property are plain text
/// symbols (digits, `#`, `*`, ©, ...) unless followed by a presentation selector.
const LAST_TEXT_STYLE_SCALAR: u32 = 0x238C;

/// First extended grapheme cluster of `text`, if any.
pub fn first_glyph(text: &str) -> Option<&str> {
    text.graphemes(true).next()
}

/// Whether a single grapheme cluster is an emoji.
pub fn is_emoji(glyph: &str) -> bool {
    let mut scalars = glyph.chars();
    let Some(first) = scalars.next() else {
        return false;
    };
    if !unic_emoji_char::is_emoji(first) {
        return false;
    }
    u32::from(first) > LAST_TEXT_STYLE_SCALAR || scalars.next().is_some()
}

/// The first glyph of `text` when it is an emoji.
pub fn leading_emoji(text: &str) -> Option<&str> {
    first_glyph(text).filter(|glyph| is_emoji(glyph))
}

/// Split a string into its emoji glyphs, skipping anything else.
pub fn emoji_glyphs(text: &str) -> Vec<String> {
    text.graphemes(true)
        .filter(|glyph| is_emoji(glyph))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_emoji() {
        assert!(is_emoji("🔥"));
        assert!(is_emoji("😀"));
        assert!(is_emoji("🚀"));
    }

    #[test]
    fn test_plain_text_is_not_emoji() {
        assert!(!is_emoji("a"));
        assert!(!is_emoji("1"));
        assert!(!is_emoji("#"));
        assert!(!is_emoji(""));
    }

    #[test]
    fn test_presentation_selector_counts() {
        // U+26BD U+FE0F: above the cutoff anyway
        assert!(is_emoji("⚽️"));
        // Keycap sequence: '1' + FE0F + 20E3
        assert!(is_emoji("1\u{FE0F}\u{20E3}"));
    }

    #[test]
    fn test_leading_emoji() {
        assert_eq!(leading_emoji("🔥 hot"), Some("🔥"));
        assert_eq!(leading_emoji("hot 🔥"), None);
        assert_eq!(leading_emoji(""), None);
    }

    #[test]
    fn test_first_glyph_keeps_clusters_together() {
        assert_eq!(first_glyph("❤️x"), Some("❤️"));
        assert_eq!(first_glyph("🏳️‍🌈!"), Some("🏳️‍🌈"));
    }

    #[test]
    fn test_emoji_glyphs() {
        let glyphs = emoji_glyphs("a🔥b🍎");
        assert_eq!(glyphs, vec!["🔥".to_string(), "🍎".to_string()]);
    }
}
