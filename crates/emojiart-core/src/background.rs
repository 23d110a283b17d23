//! Background references and decoded background images.

use crate::error::{EmojiArtError, EmojiArtResult};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use url::Url;

/// What the document says its background is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Background {
    #[default]
    Blank,
    Url(Url),
    ImageData(Vec<u8>),
}

/// Observable load state of the background image.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BackgroundStatus {
    /// No background.
    #[default]
    None,
    /// Waiting on a fetch of this URL.
    Fetching(Url),
    /// Image is available.
    Resolved(BackgroundImage),
}

impl BackgroundStatus {
    /// Whether a fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        matches!(self, BackgroundStatus::Fetching(_))
    }

    /// The resolved image, if any.
    pub fn image(&self) -> Option<&BackgroundImage> {
        match self {
            BackgroundStatus::Resolved(image) => Some(image),
            _ => None,
        }
    }
}

/// Encoded image format of a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A background image: the encoded bytes plus what the header says about them.
#[derive(Clone, PartialEq)]
pub struct BackgroundImage {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: ImageFormat,
}

impl std::fmt::Debug for BackgroundImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundImage")
            .field("bytes", &self.data.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish()
    }
}

impl BackgroundImage {
    /// Read the header of an encoded image to learn its format and pixel size.
    ///
    /// Only the header is parsed; pixel data stays encoded.
    pub fn decode(data: Vec<u8>) -> EmojiArtResult<Self> {
        let format = ImageFormat::from_magic_bytes(&data)
            .ok_or_else(|| EmojiArtError::ImageDecode("unrecognized image format".to_string()))?;
        let (width, height) = image::ImageReader::new(Cursor::new(&data))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| EmojiArtError::ImageDecode(e.to_string()))?;
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Pixel size as a kurbo size.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Unwrap image search result links.
///
/// Search engines wrap the real image location in an `imgurl` query
/// parameter; when present, that URL is the one to fetch.
pub fn image_url(url: &Url) -> Url {
    url.query_pairs()
        .find(|(key, _)| key == "imgurl")
        .and_then(|(_, value)| Url::parse(&value).ok())
        .unwrap_or_else(|| url.clone())
}

#[cfg(test)]
pub(crate) mod test_images {
    use std::io::Cursor;

    /// Encode a blank PNG of the given size.
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .expect("encode png");
        data
    }
}
