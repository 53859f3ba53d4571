//! List types.

use serde::{Deserialize, Serialize};

/// One list item.
///
/// Numbered items keep their numeral in `text` ("2. Ship it"), so the
/// rendered list never renumbers them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Whether the source line carried a number
    pub ordered: bool,

    /// Marker as it appeared in the source ("•", "-", "3.")
    pub marker: String,

    /// Item content
    pub text: String,
}

impl ListItem {
    /// Create a bulleted item.
    pub fn bullet(marker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            ordered: false,
            marker: marker.into(),
            text: text.into(),
        }
    }

    /// Create a numbered item; the numeral is kept as the text prefix.
    pub fn numbered(number: &str, content: &str) -> Self {
        Self {
            ordered: true,
            marker: format!("{}.", number),
            text: format!("{}. {}", number, content),
        }
    }

    /// Append a continuation line to the item.
    pub fn append(&mut self, continuation: &str) {
        if self.text.is_empty() {
            self.text.push_str(continuation);
        } else {
            self.text.push(' ');
            self.text.push_str(continuation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_keeps_numeral() {
        let item = ListItem::numbered("12", "Review the draft");
        assert!(item.ordered);
        assert_eq!(item.marker, "12.");
        assert_eq!(item.text, "12. Review the draft");
    }

    #[test]
    fn test_append_continuation() {
        let mut item = ListItem::bullet("•", "First part");
        item.append("second part");
        assert_eq!(item.text, "First part second part");
    }
}
