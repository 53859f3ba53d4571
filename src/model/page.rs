//! Page-level types.

use super::{ListItem, Table};
use serde::{Deserialize, Serialize};

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Content blocks on the page, in source line order
    pub elements: Vec<Block>,
}

impl Page {
    /// Create a new empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            elements: Vec::new(),
        }
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: Block) {
        self.elements.push(block);
    }

    /// Check if the page is empty (no content blocks).
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get the number of blocks on the page.
    pub fn block_count(&self) -> usize {
        self.elements.len()
    }
}

/// A content block on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading (level 1-3)
    Heading {
        /// Heading level
        level: u8,
        /// Heading text
        text: String,
    },

    /// A run of list items
    List {
        /// Items in source order
        items: Vec<ListItem>,
    },

    /// A table
    Table(Table),

    /// A single line of body text
    Paragraph {
        /// Line text
        text: String,
    },
}

impl Block {
    /// Create a heading block.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, 3),
            text: text.into(),
        }
    }

    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Check if this block is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Block::Heading { .. })
    }

    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph { .. })
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Check if this block is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Block::List { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    #[test]
    fn test_page_new() {
        let page = Page::new(3);
        assert_eq!(page.number, 3);
        assert!(page.is_empty());
    }

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(
            Block::heading(7, "Deep"),
            Block::Heading {
                level: 3,
                text: "Deep".into()
            }
        );
    }

    #[test]
    fn test_block_variants() {
        let table = Block::Table(Table::new(TableRow::from_strings(["a", "b"])));
        assert!(table.is_table());
        assert!(!table.is_paragraph());
        assert!(Block::paragraph("x").is_paragraph());
        assert!(Block::List { items: vec![] }.is_list());
    }

    #[test]
    fn test_add_block_keeps_order() {
        let mut page = Page::new(1);
        page.add_block(Block::heading(1, "TITLE"));
        page.add_block(Block::paragraph("Body"));
        assert_eq!(page.block_count(), 2);
        assert!(page.elements[0].is_heading());
    }
}
