//! # pagemark
//!
//! Structural Markdown reconstruction from extracted PDF page text and
//! embedded raster images.
//!
//! The crate receives what a PDF extractor produced (one text string and a
//! list of image objects per page) and rebuilds a readable document:
//! headings, pipe tables, bullet lists and paragraphs, with recovered
//! images written as PNG and referenced from the page they came from.
//! Contact details and company references are redacted before any
//! structure is inferred.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagemark::{convert_file, ConvertOptions};
//!
//! fn main() -> pagemark::Result<()> {
//!     let conversion = convert_file("bundle.json", &ConvertOptions::default())?;
//!     println!("{}", conversion.markdown);
//!
//!     for warning in conversion.report.warnings() {
//!         eprintln!("{}", warning.message());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Redaction**: emails, non-allowed website hosts, company names
//! - **Line classification**: headings, tables, lists and paragraphs
//! - **Image recovery**: JPEG, TIFF, PNG and raw Flate samples, soft masks,
//!   ICC profiles, flattened onto white
//! - **Diagnostics**: every assumption and failure is reported, nothing aborts

pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod parser;
pub mod raster;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use convert::{convert, Conversion, ConversionReport, ConvertOptions};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, RedactionKind, Severity};
pub use error::{Error, IccError, ImageError, MaskError, Result};
pub use model::{Block, ColorMode, Document, ImageAsset, ListItem, Page, Provenance, Table, TableRow};
pub use parser::{LineClassifier, PageParser, SanitizeOptions, Sanitizer, ScanState};
pub use raster::{ImageFailure, ImageOptions, ImageRecovery};
pub use render::{JsonFormat, PageSelection, RenderOptions};
pub use source::{RasterObject, SourceDocument, SourcePage};

use std::path::{Path, PathBuf};

/// Convert a JSON extraction bundle read from disk.
///
/// # Example
///
/// ```no_run
/// use pagemark::{convert_file, ConvertOptions};
///
/// let conversion = convert_file("bundle.json", &ConvertOptions::default()).unwrap();
/// println!("Pages: {}", conversion.document.page_count());
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Conversion> {
    let source = SourceDocument::from_file(path)?;
    Ok(convert(&source, options))
}

/// Convert a JSON extraction bundle held in memory.
pub fn convert_json(json: &str, options: &ConvertOptions) -> Result<Conversion> {
    let source = SourceDocument::from_json(json)?;
    Ok(convert(&source, options))
}

/// Convert plain page texts to Markdown with default options.
///
/// # Example
///
/// ```
/// let md = pagemark::text_to_markdown(["TERMS AND CONDITIONS"]);
/// assert!(md.contains("# TERMS AND CONDITIONS"));
/// ```
pub fn text_to_markdown<S: Into<String>>(pages: impl IntoIterator<Item = S>) -> String {
    convert(&SourceDocument::from_texts(pages), &ConvertOptions::default()).markdown
}

/// Builder for conversions.
///
/// # Example
///
/// ```no_run
/// use pagemark::Pagemark;
///
/// let conversion = Pagemark::new()
///     .allow_host("example.org")
///     .with_images_dir("out/images")
///     .with_link_prefix("images/")
///     .convert_file("bundle.json")
///     .unwrap();
/// conversion.save_markdown("out/document.md").unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pagemark {
    options: ConvertOptions,
}

impl Pagemark {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep links to this host (and its subdomains).
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.options.sanitize = self.options.sanitize.allow_host(host);
        self
    }

    /// Replace the host allow-list.
    pub fn with_allowed_hosts<S: Into<String>>(mut self, hosts: impl IntoIterator<Item = S>) -> Self {
        self.options.sanitize = self.options.sanitize.with_allowed_hosts(hosts);
        self
    }

    /// Normalize Unicode, ligatures and replacement characters before redaction.
    pub fn normalize_text(mut self) -> Self {
        self.options.sanitize = self.options.sanitize.normalized();
        self
    }

    /// Enable or disable image recovery.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.options.images.extract = extract;
        self
    }

    /// Write recovered images to a directory.
    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.images = self.options.images.with_images_dir(dir);
        self
    }

    /// Set the prefix of image links.
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.images = self.options.images.with_link_prefix(prefix);
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options.render = self.options.render.with_pages(pages);
        self
    }

    /// Omit the provenance comment.
    pub fn without_provenance(mut self) -> Self {
        self.options.render = self.options.render.with_provenance(false);
        self
    }

    /// Stamp the provenance comment with the conversion time.
    pub fn with_timestamp(mut self) -> Self {
        self.options.timestamp = true;
        self
    }

    /// Get the assembled options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert an extracted document.
    pub fn convert(&self, source: &SourceDocument) -> Conversion {
        convert(source, &self.options)
    }

    /// Convert a JSON extraction bundle read from disk.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<Conversion> {
        convert_file(path, &self.options)
    }

    /// Convert a JSON extraction bundle held in memory.
    pub fn convert_json(&self, json: &str) -> Result<Conversion> {
        convert_json(json, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let builder = Pagemark::new()
            .allow_host("example.org")
            .with_images(false)
            .with_link_prefix("img/")
            .without_provenance();

        let options = builder.options();
        assert!(options.sanitize.is_host_allowed("example.org"));
        assert!(options.sanitize.is_host_allowed("microsoft.com"));
        assert!(!options.images.extract);
        assert_eq!(options.images.link_prefix, "img/");
        assert!(!options.render.include_provenance);
    }

    #[test]
    fn test_text_to_markdown() {
        let md = text_to_markdown(["TERMS AND CONDITIONS"]);
        assert!(md.starts_with("<!-- Generated by pagemark v"));
        assert!(md.contains("\n\n# TERMS AND CONDITIONS\n\n---\n"));
    }

    #[test]
    fn test_convert_json_rejects_garbage() {
        assert!(matches!(
            convert_json("{not json", &ConvertOptions::default()),
            Err(Error::Json(_))
        ));
    }
}
