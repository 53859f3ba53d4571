//! Document-level types.

use super::{ImageAsset, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reconstructed document: page blocks plus recovered images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Who produced the document
    pub provenance: Provenance,

    /// Pages in input order
    pub pages: Vec<Page>,

    /// Recovered images keyed by position in `pages`, in object order.
    /// Page numbers may repeat, so they cannot serve as the key.
    pub assets: BTreeMap<usize, Vec<ImageAsset>>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            provenance: Provenance::default(),
            pages: Vec::new(),
            assets: BTreeMap::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Add a page to the document, returning its position.
    pub fn add_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    /// Attach a recovered image to the page at `position`.
    pub fn add_asset(&mut self, position: usize, asset: ImageAsset) {
        self.assets.entry(position).or_default().push(asset);
    }

    /// Images recovered from the page at `position`.
    pub fn assets_at(&self, position: usize) -> &[ImageAsset] {
        self.assets
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over all assets in page order.
    pub fn all_assets(&self) -> impl Iterator<Item = &ImageAsset> {
        self.assets.values().flatten()
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer information written at the top of the Markdown output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    /// Generator name
    pub generator: String,

    /// Generator version
    pub version: String,

    /// Name of the source document, if known
    pub source: Option<String>,

    /// When the conversion ran
    pub generated_at: Option<DateTime<Utc>>,
}

impl Provenance {
    /// Provenance for the running crate version.
    pub fn current() -> Self {
        Self {
            generator: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            source: None,
            generated_at: None,
        }
    }

    /// Render as an HTML comment.
    pub fn to_comment(&self) -> String {
        let mut comment = format!("<!-- Generated by {} v{}", self.generator, self.version);
        if let Some(ref source) = self.source {
            comment.push_str(&format!(" from {}", escape_comment(source)));
        }
        if let Some(ref at) = self.generated_at {
            comment.push_str(&format!(" at {}", at.to_rfc3339()));
        }
        comment.push_str(" -->");
        comment
    }
}

impl Default for Provenance {
    fn default() -> Self {
        Self::current()
    }
}

/// Keep user-supplied names from closing the comment early.
fn escape_comment(s: &str) -> String {
    s.replace("--", "- -")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColorMode;
    use chrono::TimeZone;

    fn asset(page: u32, ordinal: u32) -> ImageAsset {
        ImageAsset {
            page,
            ordinal,
            color_mode: ColorMode::Rgb,
            width: 1,
            height: 1,
            pixels: vec![255, 255, 255],
            icc_profile: None,
            alt_text: ImageAsset::alt_text_for(page),
            file_name: ImageAsset::file_name_for(page, ordinal),
            relative_path: ImageAsset::file_name_for(page, ordinal),
        }
    }

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(doc.assets_at(0).is_empty());
    }

    #[test]
    fn test_assets_keyed_by_position() {
        let mut doc = Document::new();
        let first = doc.add_page(Page::new(1));
        let second = doc.add_page(Page::new(2));
        doc.add_asset(second, asset(2, 1));
        doc.add_asset(first, asset(1, 1));
        doc.add_asset(second, asset(2, 2));

        assert_eq!((first, second), (0, 1));
        assert_eq!(doc.assets_at(second).len(), 2);
        let names: Vec<_> = doc.all_assets().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["image_1_1.png", "image_2_1.png", "image_2_2.png"]);
    }

    #[test]
    fn test_repeated_page_numbers_keep_separate_assets() {
        let mut doc = Document::new();
        let first = doc.add_page(Page::new(1));
        let again = doc.add_page(Page::new(1));
        doc.add_asset(first, asset(1, 1));
        doc.add_asset(again, asset(1, 2));

        assert_eq!(doc.assets_at(first)[0].file_name, "image_1_1.png");
        assert_eq!(doc.assets_at(again)[0].file_name, "image_1_2.png");
        assert_eq!(doc.assets_at(again).len(), 1);
    }

    #[test]
    fn test_provenance_comment() {
        let mut provenance = Provenance::current();
        assert!(provenance.to_comment().starts_with("<!-- Generated by pagemark v"));

        provenance.source = Some("report--final.pdf".to_string());
        provenance.generated_at = Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        let comment = provenance.to_comment();
        assert!(comment.contains("from report- -final.pdf"));
        assert!(comment.contains("at 2024-01-02T03:04:05+00:00"));
        assert!(comment.ends_with(" -->"));
    }
}
