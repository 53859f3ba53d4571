//! Rendering module for converting documents to output formats.

mod json;
mod markdown;
mod options;
mod result;

pub use json::{to_json, JsonFormat};
pub use markdown::{
    to_markdown, to_markdown_with_stats, MarkdownRenderer, IMAGES_HEADING, PAGE_SEPARATOR,
};
pub use options::{PageSelection, RenderOptions};
pub use result::{ExtractionStats, RenderResult};
