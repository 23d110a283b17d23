//! Wire format of the app's input events.

use base64::{Engine, engine::general_purpose::STANDARD};
use emojiart_core::{DropPayload, EmojiId, TouchEvent};
use serde::{Deserialize, Serialize};

/// One dropped representation. Image bytes travel as base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WirePayload {
    Url(String),
    Image(String),
    Text(String),
}

impl WirePayload {
    /// Decode into a core payload.
    pub fn into_payload(self) -> Result<DropPayload, base64::DecodeError> {
        Ok(match self {
            WirePayload::Url(url) => DropPayload::Url(url),
            WirePayload::Image(data) => DropPayload::Image(STANDARD.decode(data)?),
            WirePayload::Text(text) => DropPayload::Text(text),
        })
    }
}

/// An input event, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// The viewport changed size.
    Resize { width: f64, height: f64 },
    Touch(TouchEvent),
    /// Something was dropped at screen position (`x`, `y`).
    Drop { x: f64, y: f64, payloads: Vec<WirePayload> },
    /// The delete button of a selected emoji was pressed.
    Delete { id: EmojiId },
    /// A palette glyph was dragged onto the canvas.
    PaletteDrop { index: usize, x: f64, y: f64 },
    /// The host abandoned all gestures.
    Cancel,
}

impl AppEvent {
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emojiart_core::TouchPhase;
    use kurbo::Point;

    #[test]
    fn test_parse_touch() {
        let event = AppEvent::from_json(
            r#"{"type":"touch","phase":"start","id":3,"position":{"x":1.0,"y":2.0},"timestamp_ms":15}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            AppEvent::Touch(TouchEvent::new(TouchPhase::Start, 3, Point::new(1.0, 2.0), 15))
        );
    }

    #[test]
    fn test_parse_drop() {
        let event = AppEvent::from_json(
            r#"{"type":"drop","x":10,"y":20,"payloads":[{"kind":"text","value":"🔥"},{"kind":"image","value":"AQID"}]}"#,
        )
        .unwrap();
        let AppEvent::Drop { x, y, payloads } = event else {
            panic!("expected drop");
        };
        assert_eq!((x, y), (10.0, 20.0));
        let payloads: Vec<_> = payloads.into_iter().map(|p| p.into_payload().unwrap()).collect();
        assert_eq!(
            payloads,
            vec![DropPayload::Text("🔥".into()), DropPayload::Image(vec![1, 2, 3])]
        );
    }

    #[test]
    fn test_bad_base64() {
        assert!(WirePayload::Image("***".into()).into_payload().is_err());
    }

    #[test]
    fn test_unknown_event_type() {
        assert!(AppEvent::from_json(r#"{"type":"explode"}"#).is_err());
        assert_eq!(AppEvent::from_json(r#"{"type":"cancel"}"#).unwrap(), AppEvent::Cancel);
    }
}
