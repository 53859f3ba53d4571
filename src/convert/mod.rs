//! End-to-end conversion of an extracted document.
//!
//! Pages are processed in input order: text is sanitized and classified,
//! then the page's raster objects are recovered. Nothing here is fatal:
//! every problem ends up in the [`ConversionReport`].

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::error::Result;
use crate::model::Document;
use crate::parser::{PageParser, SanitizeOptions};
use crate::raster::{ImageFailure, ImageOptions, ImageRecovery};
use crate::render::{to_json, to_markdown_with_stats, ExtractionStats, JsonFormat, RenderOptions};
use crate::source::SourceDocument;

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Text sanitizing options
    pub sanitize: SanitizeOptions,

    /// Image recovery options
    pub images: ImageOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Stamp the provenance comment with the conversion time
    pub timestamp: bool,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sanitize options.
    pub fn with_sanitize_options(mut self, options: SanitizeOptions) -> Self {
        self.sanitize = options;
        self
    }

    /// Set image options.
    pub fn with_image_options(mut self, options: ImageOptions) -> Self {
        self.images = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Enable or disable the generation timestamp.
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Everything that went wrong or was assumed during a conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Rendering statistics
    pub stats: ExtractionStats,

    /// Raster objects that could not be recovered
    pub image_failures: Vec<ImageFailure>,

    /// All recorded events in order
    pub diagnostics: Diagnostics,
}

impl ConversionReport {
    /// Events at warning level.
    pub fn warnings(&self) -> impl Iterator<Item = &crate::diagnostics::Diagnostic> {
        self.diagnostics.at_least(Severity::Warning)
    }

    /// Number of table rows dropped for a width mismatch.
    pub fn dropped_table_rows(&self) -> usize {
        self.diagnostics
            .events()
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::TableRowDropped { .. }))
            .count()
    }

    /// Number of redacted spans.
    pub fn redaction_count(&self) -> usize {
        self.diagnostics
            .events()
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::Redaction { .. }))
            .count()
    }

    /// Check if nothing reached warning level.
    pub fn is_clean(&self) -> bool {
        self.warnings().next().is_none()
    }
}

/// Result of a conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The reconstructed document
    pub document: Document,

    /// Rendered Markdown
    pub markdown: String,

    /// Diagnostics and statistics
    pub report: ConversionReport,
}

impl Conversion {
    /// Serialize the document model to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(&self.document, format)
    }

    /// Serialize the report to JSON.
    pub fn report_json(&self, format: JsonFormat) -> Result<String> {
        to_json(&self.report, format)
    }

    /// Write the Markdown to a file, creating parent directories.
    pub fn save_markdown<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.markdown)?;
        Ok(())
    }
}

/// Convert an extracted document.
pub fn convert(source: &SourceDocument, options: &ConvertOptions) -> Conversion {
    let parser = PageParser::new(options.sanitize.clone());
    let mut recovery = ImageRecovery::new(options.images.clone());
    let mut diagnostics = Diagnostics::new();
    let mut image_failures = Vec::new();

    let mut document = Document::new();
    document.provenance.source = source.name.clone();
    if options.timestamp {
        document.provenance.generated_at = Some(Utc::now());
    }

    for source_page in &source.pages {
        let number = source_page.number;
        if !options.render.page_selection.includes(number) {
            continue;
        }

        let page = parser.parse_page(number, source_page.text.as_deref(), &mut diagnostics);
        let position = document.add_page(page);

        let outcomes = recovery.recover_page(number, &source_page.images, &mut diagnostics);
        for (object_index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(asset) => document.add_asset(position, asset),
                Err(e) => image_failures.push(ImageFailure {
                    page: number,
                    object_index,
                    reason: e.to_string(),
                }),
            }
        }
    }

    let rendered = to_markdown_with_stats(&document, &options.render);
    log::info!(
        "converted {} pages ({} images, {} image failures)",
        document.page_count(),
        document.all_assets().count(),
        image_failures.len()
    );

    Conversion {
        document,
        markdown: rendered.content,
        report: ConversionReport {
            stats: rendered.stats,
            image_failures,
            diagnostics,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RasterObject, SourcePage};

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_sanitize_options(SanitizeOptions::new().allow_host("example.org"))
            .with_image_options(ImageOptions::new().skip_images())
            .with_timestamp(true);
        assert!(options.timestamp);
        assert!(!options.images.extract);
        assert!(options.sanitize.is_host_allowed("example.org"));
    }

    #[test]
    fn test_convert_collects_failures() {
        let source = SourceDocument {
            name: Some("report.pdf".to_string()),
            pages: vec![
                SourcePage::new(1, "TERMS AND CONDITIONS")
                    .with_image(RasterObject::new("RunLengthDecode", 1, 1, vec![0])),
                SourcePage::missing(2),
            ],
        };

        let conversion = convert(&source, &ConvertOptions::default());
        assert!(conversion
            .markdown
            .starts_with("<!-- Generated by pagemark v"));
        assert!(conversion.markdown.contains("from report.pdf"));
        assert!(conversion.markdown.contains("# TERMS AND CONDITIONS"));

        let report = &conversion.report;
        assert_eq!(report.image_failures.len(), 1);
        assert_eq!(report.image_failures[0].page, 1);
        assert!(report
            .warnings()
            .any(|d| d.page == 2 && d.kind == DiagnosticKind::PageTextMissing));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_page_selection_skips_work() {
        let source = SourceDocument::from_texts(["OPENING REMARKS", "CLOSING REMARKS"]);
        let options = ConvertOptions::new()
            .with_render_options(RenderOptions::new().with_page_range(2..=2));
        let conversion = convert(&source, &options);
        assert_eq!(conversion.document.page_count(), 1);
        assert!(!conversion.markdown.contains("OPENING"));
    }

    #[test]
    fn test_timestamp_in_provenance() {
        let source = SourceDocument::from_texts(["x"]);
        let conversion = convert(&source, &ConvertOptions::new().with_timestamp(true));
        assert!(conversion.document.provenance.generated_at.is_some());
        assert!(conversion.markdown.lines().next().unwrap().contains(" at "));
    }
}
