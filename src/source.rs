//! Input supplied by the PDF extraction layer.
//!
//! Text extraction and object traversal happen elsewhere; this crate
//! receives one [`SourcePage`] per page with the page text and the raster
//! objects declared on it. All types deserialize from JSON so an
//! extraction bundle can be handed over as a file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A whole extracted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Name of the original file, used in the provenance comment
    #[serde(default)]
    pub name: Option<String>,

    /// Pages in reading order
    pub pages: Vec<SourcePage>,
}

impl SourceDocument {
    /// Build a document from plain page texts with no images.
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: None,
            pages: texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| SourcePage::new(i as u32 + 1, text))
                .collect(),
        }
    }

    /// Parse a JSON extraction bundle.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SourceDocument = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Read a JSON extraction bundle from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if let Some(page) = self.pages.iter().find(|p| p.number == 0) {
            return Err(Error::InvalidInput(format!(
                "page numbers are 1-indexed, got 0 (text: {:?})",
                page.text.as_deref().map(|t| t.chars().take(20).collect::<String>())
            )));
        }
        Ok(())
    }
}

/// One page as delivered by the extraction layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePage {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page text; `None` when the extractor could not read it
    #[serde(default)]
    pub text: Option<String>,

    /// Raster objects in declaration order
    #[serde(default)]
    pub images: Vec<RasterObject>,
}

impl SourcePage {
    /// Create a page with text and no images.
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: Some(text.into()),
            images: Vec::new(),
        }
    }

    /// Create a page whose text could not be extracted.
    pub fn missing(number: u32) -> Self {
        Self {
            number,
            text: None,
            images: Vec::new(),
        }
    }

    /// Add a raster object.
    pub fn with_image(mut self, image: RasterObject) -> Self {
        self.images.push(image);
        self
    }
}

/// An image XObject with its stream data and dictionary entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RasterObject {
    /// Filter name without the leading slash (e.g. "DCTDecode")
    #[serde(default)]
    pub filter: Option<String>,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Color space name (e.g. "DeviceRGB"); the first element for array color spaces
    #[serde(default)]
    pub color_space: Option<String>,

    /// Bits per component (8 when absent)
    #[serde(default)]
    pub bits_per_component: Option<u8>,

    /// Stream payload
    #[serde(default, with = "bytes_b64")]
    pub data: Vec<u8>,

    /// Soft mask image
    #[serde(default)]
    pub soft_mask: Option<Box<RasterObject>>,

    /// ICC profile stream payload
    #[serde(default, with = "opt_bytes_b64")]
    pub icc_profile: Option<Vec<u8>>,
}

impl RasterObject {
    /// Create an object with the given filter and geometry.
    pub fn new(filter: impl Into<String>, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            filter: Some(filter.into()),
            width,
            height,
            data,
            ..Default::default()
        }
    }

    /// Set color space.
    pub fn with_color_space(mut self, color_space: impl Into<String>) -> Self {
        self.color_space = Some(color_space.into());
        self
    }

    /// Set bits per component.
    pub fn with_bits_per_component(mut self, bits: u8) -> Self {
        self.bits_per_component = Some(bits);
        self
    }

    /// Attach a soft mask.
    pub fn with_soft_mask(mut self, mask: RasterObject) -> Self {
        self.soft_mask = Some(Box::new(mask));
        self
    }

    /// Attach an ICC profile.
    pub fn with_icc_profile(mut self, profile: Vec<u8>) -> Self {
        self.icc_profile = Some(profile);
        self
    }

    /// Filter name with any leading slash removed.
    pub fn filter_name(&self) -> Option<&str> {
        self.filter.as_deref().map(|f| f.trim_start_matches('/'))
    }

    /// Color space name with any leading slash removed.
    pub fn color_space_name(&self) -> Option<&str> {
        self.color_space.as_deref().map(|c| c.trim_start_matches('/'))
    }
}

/// Byte payloads travel as standard base64 strings in JSON.
mod bytes_b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.trim()).map_err(serde::de::Error::custom)
    }
}

mod opt_bytes_b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| STANDARD.decode(s.trim()).map_err(serde::de::Error::custom))
            .transpose()
    }
}
