//! Recovered image assets.

use serde::{Deserialize, Serialize};

/// Pixel layout of a recovered asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// 8-bit RGB
    Rgb,
    /// 8-bit RGBA (always fully opaque once flattened)
    Rgba,
}

impl ColorMode {
    /// Bytes per pixel.
    pub fn channels(&self) -> usize {
        match self {
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Rgb => write!(f, "RGB"),
            ColorMode::Rgba => write!(f, "RGBA"),
        }
    }
}

/// An image recovered from a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Page number (1-indexed)
    pub page: u32,

    /// Position among the page's recovered images (1-indexed)
    pub ordinal: u32,

    /// Pixel layout
    pub color_mode: ColorMode,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Flattened pixel data
    #[serde(skip)]
    pub pixels: Vec<u8>,

    /// ICC profile embedded in the PNG, if any
    #[serde(skip)]
    pub icc_profile: Option<Vec<u8>>,

    /// Generated alt text
    pub alt_text: String,

    /// File name (`image_<page>_<ordinal>.png`)
    pub file_name: String,

    /// Link used in the Markdown output
    pub relative_path: String,
}

impl ImageAsset {
    /// File name for a page/ordinal pair.
    pub fn file_name_for(page: u32, ordinal: u32) -> String {
        format!("image_{}_{}.png", page, ordinal)
    }

    /// Alt text for an image on the given page.
    pub fn alt_text_for(page: u32) -> String {
        format!("Image from page {}", page)
    }

    /// Markdown image reference.
    pub fn to_markdown(&self) -> String {
        format!("![{}]({})", self.alt_text, self.relative_path)
    }

    /// Check that every pixel is fully opaque.
    pub fn is_opaque(&self) -> bool {
        match self.color_mode {
            ColorMode::Rgb => true,
            ColorMode::Rgba => self
                .pixels
                .chunks_exact(self.color_mode.channels())
                .all(|px| px[3] == u8::MAX),
        }
    }
}
