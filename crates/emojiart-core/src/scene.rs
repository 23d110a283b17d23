//! Render list produced by the canvas.
//!
//! A [`Scene`] is everything a renderer needs to draw one frame, already in
//! screen coordinates.

use crate::document::EmojiId;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Where to draw the background image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundPlacement {
    /// Screen position of the image center.
    pub center: Point,
    /// Uniform scale applied to the image's pixel size.
    pub scale: f64,
    pub width: u32,
    pub height: u32,
}

impl BackgroundPlacement {
    /// Screen rectangle the image covers.
    pub fn bounds(&self) -> Rect {
        let size = Size::new(f64::from(self.width), f64::from(self.height)) * self.scale;
        Rect::from_center_size(self.center, size)
    }
}

/// One emoji as it should appear on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedEmoji {
    pub id: EmojiId,
    pub text: String,
    /// Screen position of the glyph center.
    pub position: Point,
    /// Font size in screen points.
    pub font_size: f64,
    pub selected: bool,
    /// Position of the delete button, shown on selected emoji.
    pub delete_handle: Option<Point>,
}

impl RenderedEmoji {
    /// The selection square around the glyph.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, Size::new(self.font_size, self.font_size))
    }
}

/// A frame's worth of drawing instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub viewport: Size,
    pub zoom: f64,
    /// Effective pan offset in screen units.
    pub pan: Vec2,
    pub background: Option<BackgroundPlacement>,
    /// A background fetch is in flight; show a progress indicator.
    pub loading: bool,
    /// Back to front.
    pub emojis: Vec<RenderedEmoji>,
}

impl Scene {
    pub fn emoji(&self, id: EmojiId) -> Option<&RenderedEmoji> {
        self.emojis.iter().find(|e| e.id == id)
    }
}
