//! Drop target payload resolution.

use crate::background::{BackgroundImage, image_url};
use crate::glyph::leading_emoji;
use url::Url;

/// One representation of a dropped item. A single drop may offer several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    Url(String),
    /// Encoded image bytes.
    Image(Vec<u8>),
    Text(String),
}

/// What an accepted drop does to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum DropAction {
    /// Fetch this URL as the new background.
    BackgroundUrl(Url),
    BackgroundImage(BackgroundImage),
    /// Place this glyph at the drop location.
    AddEmoji(String),
}

/// Pick the action for a drop.
///
/// URLs win over images, images over text. Payloads of a kind that fail to
/// parse are skipped, so a bad URL can still fall back to an image or glyph.
/// Returns None when nothing is acceptable.
pub fn resolve_drop(payloads: &[DropPayload]) -> Option<DropAction> {
    let url = payloads.iter().find_map(|payload| match payload {
        DropPayload::Url(raw) => match Url::parse(raw.trim()) {
            Ok(url) => Some(image_url(&url)),
            Err(e) => {
                log::debug!("Ignoring dropped URL {:?}: {}", raw, e);
                None
            }
        },
        _ => None,
    });
    if let Some(url) = url {
        return Some(DropAction::BackgroundUrl(url));
    }

    let image = payloads.iter().find_map(|payload| match payload {
        DropPayload::Image(data) => match BackgroundImage::decode(data.clone()) {
            Ok(image) => Some(image),
            Err(e) => {
                log::debug!("Ignoring dropped image: {}", e);
                None
            }
        },
        _ => None,
    });
    if let Some(image) = image {
        return Some(DropAction::BackgroundImage(image));
    }

    payloads.iter().find_map(|payload| match payload {
        DropPayload::Text(text) => leading_emoji(text).map(|glyph| DropAction::AddEmoji(glyph.to_string())),
        _ => None,
    })
}
