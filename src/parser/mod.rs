//! Page text parsing: sanitizing and line classification.

pub mod classifier;
pub mod list_builder;
mod options;
pub mod sanitize;
pub mod table_builder;

pub use classifier::{HeadingRule, LineClassifier, LineKind, ScanState};
pub use list_builder::{ListBuilder, ListLine};
pub use options::{SanitizeOptions, DEFAULT_ALLOWED_HOSTS};
pub use sanitize::Sanitizer;
pub use table_builder::TableBuilder;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::Page;

/// Turns page text into blocks.
pub struct PageParser {
    sanitizer: Sanitizer,
    classifier: LineClassifier,
}

impl PageParser {
    /// Create a parser with the given sanitize options.
    pub fn new(options: SanitizeOptions) -> Self {
        Self {
            sanitizer: Sanitizer::new(options),
            classifier: LineClassifier::new(),
        }
    }

    /// Parse one page.
    ///
    /// A page without text yields an empty page and a warning.
    pub fn parse_page(&self, number: u32, text: Option<&str>, diagnostics: &mut Diagnostics) -> Page {
        let mut page = Page::new(number);

        let Some(text) = text else {
            diagnostics.push(number, DiagnosticKind::PageTextMissing);
            return page;
        };

        let clean = self.sanitizer.sanitize(number, text, diagnostics);
        for block in self.classifier.classify_page(&clean, number, diagnostics) {
            page.add_block(block);
        }

        log::debug!("page {}: {} blocks", number, page.block_count());
        page
    }
}

impl Default for PageParser {
    fn default() -> Self {
        Self::new(SanitizeOptions::default())
    }
}
