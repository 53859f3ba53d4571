//! List marker recognition and list rendering.

use regex::Regex;

use crate::model::{Block, ListItem};

/// A line that starts with a list marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListLine {
    /// Bullet marker (`•`, `-`, `*`, possibly repeated)
    Bullet {
        /// Marker characters as they appeared
        marker: String,
        /// Text after the marker, trimmed; may be empty
        content: String,
    },
    /// Decimal numeral followed by a period and whitespace
    Numbered {
        /// Digits of the numeral
        number: String,
        /// Text after the numeral, trimmed
        content: String,
    },
}

impl ListLine {
    /// Convert into a list item; `None` for a bare marker.
    pub fn into_item(self) -> Option<ListItem> {
        match self {
            ListLine::Bullet { marker, content } => {
                if content.is_empty() {
                    None
                } else {
                    Some(ListItem::bullet(marker, content))
                }
            }
            ListLine::Numbered { number, content } => Some(ListItem::numbered(&number, &content)),
        }
    }
}

/// Recognizes list markers.
pub struct ListBuilder {
    bullet_regex: Regex,
    number_regex: Regex,
}

impl ListBuilder {
    /// Create a new list builder.
    pub fn new() -> Self {
        Self {
            bullet_regex: Regex::new(r"^([\s•\-*]+)(.*)$").unwrap(),
            number_regex: Regex::new(r"^(\d+)\.\s+(.*)$").unwrap(),
        }
    }

    /// Match a trimmed line against the bullet and numbered patterns, in that order.
    pub fn parse(&self, line: &str) -> Option<ListLine> {
        if let Some(caps) = self.bullet_regex.captures(line) {
            return Some(ListLine::Bullet {
                marker: caps[1].trim().to_string(),
                content: caps[2].trim().to_string(),
            });
        }

        self.number_regex.captures(line).map(|caps| ListLine::Numbered {
            number: caps[1].to_string(),
            content: caps[2].trim().to_string(),
        })
    }

    /// Wrap buffered items in a list block; `None` when there are none.
    pub fn build(items: Vec<ListItem>) -> Option<Block> {
        if items.is_empty() {
            None
        } else {
            Some(Block::List { items })
        }
    }
}

impl Default for ListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render items as `- ` lines in source order.
pub fn to_markdown(items: &[ListItem]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.text))
        .collect::<Vec<_>>()
        .join("\n")
}
