//! Markdown rendering for reconstructed documents.

use crate::model::{Block, Document, ImageAsset, Page};
use crate::parser::list_builder;

use super::{ExtractionStats, RenderOptions, RenderResult};

/// Title of the per-page image section.
pub const IMAGES_HEADING: &str = "### Images from this page";

/// Separator written after every page.
pub const PAGE_SEPARATOR: &str = "---";

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Convert a document to Markdown with statistics.
pub fn to_markdown_with_stats(doc: &Document, options: &RenderOptions) -> RenderResult {
    let mut options = options.clone();
    options.collect_stats = true;
    MarkdownRenderer::new(options).render_with_stats(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render a document to Markdown.
    pub fn render(mut self, doc: &Document) -> String {
        self.render_internal(doc)
    }

    /// Render a document to Markdown with extraction statistics.
    pub fn render_with_stats(mut self, doc: &Document) -> RenderResult {
        self.options.collect_stats = true;
        let content = self.render_internal(doc);
        self.stats.count_text(&content);
        RenderResult::new(content, self.stats)
    }

    fn render_internal(&mut self, doc: &Document) -> String {
        let mut chunks = Vec::new();

        if self.options.include_provenance {
            chunks.push(doc.provenance.to_comment());
        }

        for (position, page) in doc.pages.iter().enumerate() {
            if self.options.page_selection.includes(page.number) {
                chunks.push(self.render_page(page, doc.assets_at(position)));
            }
        }

        let mut output = chunks.join("\n\n");
        output.push('\n');
        output
    }

    /// Render one page: its blocks, its images, then the separator.
    pub fn render_page(&mut self, page: &Page, assets: &[ImageAsset]) -> String {
        if self.options.collect_stats {
            self.stats.page_count += 1;
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut paragraphs: Vec<&str> = Vec::new();

        for block in &page.elements {
            if let Block::Paragraph { text } = block {
                if self.options.collect_stats {
                    self.stats.paragraph_count += 1;
                }
                paragraphs.push(text);
                continue;
            }
            if !paragraphs.is_empty() {
                chunks.push(paragraphs.join("\n"));
                paragraphs.clear();
            }
            chunks.push(self.render_block(block));
        }
        if !paragraphs.is_empty() {
            chunks.push(paragraphs.join("\n"));
        }

        if !assets.is_empty() {
            if self.options.collect_stats {
                self.stats.image_count += assets.len() as u32;
            }
            let mut section = String::from(IMAGES_HEADING);
            for asset in assets {
                section.push('\n');
                section.push_str(&asset.to_markdown());
            }
            chunks.push(section);
        }

        chunks.push(PAGE_SEPARATOR.to_string());
        chunks.join("\n\n")
    }

    fn render_block(&mut self, block: &Block) -> String {
        match block {
            Block::Heading { level, text } => {
                if self.options.collect_stats {
                    self.stats.heading_count += 1;
                }
                format!("{} {}", "#".repeat(*level as usize), text)
            }
            Block::Table(table) => {
                if self.options.collect_stats {
                    self.stats.table_count += 1;
                    self.stats.table_row_count += table.row_count() as u32;
                }
                table.to_markdown()
            }
            Block::List { items } => {
                if self.options.collect_stats {
                    self.stats.list_item_count += items.len() as u32;
                }
                list_builder::to_markdown(items)
            }
            Block::Paragraph { text } => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorMode, ListItem, Table, TableRow};

    fn asset(page: u32, ordinal: u32) -> ImageAsset {
        let file_name = ImageAsset::file_name_for(page, ordinal);
        ImageAsset {
            page,
            ordinal,
            color_mode: ColorMode::Rgb,
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0],
            icc_profile: None,
            alt_text: ImageAsset::alt_text_for(page),
            relative_path: format!("images/{}", file_name),
            file_name,
        }
    }

    fn sample() -> Document {
        let mut page = Page::new(1);
        page.add_block(Block::heading(1, "TERMS AND CONDITIONS"));
        page.add_block(Block::paragraph("first line"));
        page.add_block(Block::paragraph("second line"));
        let mut table = Table::new(TableRow::from_strings(["Name", "Age"]));
        table.push_row(TableRow::from_strings(["Alice", "30"])).unwrap();
        page.add_block(Block::Table(table));
        page.add_block(Block::List {
            items: vec![ListItem::bullet("•", "one"), ListItem::numbered("2", "two")],
        });

        let mut doc = Document::new();
        doc.add_page(page);
        let second = doc.add_page(Page::new(2));
        doc.add_asset(second, asset(2, 1));
        doc.add_asset(second, asset(2, 2));
        doc
    }

    #[test]
    fn test_render_document() {
        let md = to_markdown(&sample(), &RenderOptions::new().with_provenance(false));
        let expected = "# TERMS AND CONDITIONS\n\n\
                        first line\nsecond line\n\n\
                        | Name | Age |\n| --- | --- |\n| Alice | 30 |\n\n\
                        - one\n- 2. two\n\n\
                        ---\n\n\
                        ### Images from this page\n\
                        ![Image from page 2](images/image_2_1.png)\n\
                        ![Image from page 2](images/image_2_2.png)\n\n\
                        ---\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_provenance_first() {
        let md = to_markdown(&sample(), &RenderOptions::new());
        assert!(md.starts_with("<!-- Generated by pagemark v"));
        assert_eq!(md.matches("<!--").count(), 1);
    }

    #[test]
    fn test_page_selection() {
        let md = to_markdown(
            &sample(),
            &RenderOptions::new().with_provenance(false).with_page_range(2..=2),
        );
        assert!(!md.contains("TERMS"));
        assert!(md.contains(IMAGES_HEADING));
    }

    #[test]
    fn test_stats() {
        let result = to_markdown_with_stats(&sample(), &RenderOptions::new());
        let stats = result.stats;
        assert_eq!(stats.page_count, 2);
        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.paragraph_count, 2);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.table_row_count, 1);
        assert_eq!(stats.list_item_count, 2);
        assert_eq!(stats.image_count, 2);
        assert!(stats.word_count > 0);
    }

    #[test]
    fn test_repeated_page_number_links_once() {
        let mut doc = Document::new();
        let first = doc.add_page(Page::new(1));
        let again = doc.add_page(Page::new(1));
        doc.add_asset(first, asset(1, 1));
        doc.add_asset(again, asset(1, 2));

        let md = to_markdown(&doc, &RenderOptions::new().with_provenance(false));
        assert_eq!(md.matches("image_1_1.png").count(), 1);
        assert_eq!(md.matches("image_1_2.png").count(), 1);
        let sections: Vec<&str> = md.split("---\n").collect();
        assert!(sections[0].contains("image_1_1.png"));
        assert!(sections[1].contains("image_1_2.png"));
    }

    #[test]
    fn test_empty_page_is_separator_only() {
        let mut doc = Document::new();
        doc.add_page(Page::new(1));
        let md = to_markdown(&doc, &RenderOptions::new().with_provenance(false));
        assert_eq!(md, "---\n");
    }
}
