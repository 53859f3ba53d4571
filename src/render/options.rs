//! Rendering options and configuration.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Options for rendering a reconstructed document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit the provenance comment at the top of the output
    pub include_provenance: bool,

    /// Page selection
    pub page_selection: PageSelection,

    /// Collect extraction statistics during rendering
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the provenance comment.
    pub fn with_provenance(mut self, include: bool) -> Self {
        self.include_provenance = include;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.page_selection = PageSelection::Range(range);
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_provenance: true,
            page_selection: PageSelection::All,
            collect_stats: false,
        }
    }
}

/// Page selection for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Render all pages
    #[default]
    All,
    /// Render a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Render specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a selection such as `"3"`, `"2-5"` or `"1,4,7-9"`.
    ///
    /// A single span becomes a range; a list is flattened into sorted,
    /// de-duplicated page numbers. Page 0 and reversed spans are rejected.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let spans = s.split(',').map(parse_span).collect::<Result<Vec<_>, _>>()?;
        if let [span] = spans.as_slice() {
            return Ok(PageSelection::Range(span.clone()));
        }

        let pages: BTreeSet<u32> = spans.into_iter().flatten().collect();
        Ok(PageSelection::Pages(pages.into_iter().collect()))
    }
}

fn parse_span(part: &str) -> Result<RangeInclusive<u32>, String> {
    let part = part.trim();
    let number = |text: &str| {
        text.trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("Invalid page number: {}", part))
    };

    let (start, end) = match part.split_once('-') {
        Some((start, end)) => (number(start)?, number(end)?),
        None => {
            let page = number(part)?;
            (page, page)
        }
    };
    if start > end {
        return Err(format!("Page range runs backwards: {}", part));
    }
    Ok(start..=end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_provenance(false)
            .with_page_range(2..=4)
            .with_stats(true);

        assert!(!options.include_provenance);
        assert!(options.collect_stats);
        assert!(options.page_selection.includes(3));
        assert!(!options.page_selection.includes(5));
    }

    #[test]
    fn test_page_selection_includes() {
        let pages = PageSelection::Pages(vec![1, 3, 5, 7]);
        assert!(pages.includes(1));
        assert!(!pages.includes(2));
        assert!(PageSelection::All.includes(100));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("1-10").unwrap(), PageSelection::Range(1..=10));
        assert_eq!(
            PageSelection::parse("7,1,3,5-7").unwrap(),
            PageSelection::Pages(vec![1, 3, 5, 6, 7])
        );
        assert_eq!(PageSelection::parse(" 4 ").unwrap(), PageSelection::Range(4..=4));
        assert!(PageSelection::parse("x").is_err());
        assert!(PageSelection::parse("0-3").is_err());
        assert!(PageSelection::parse("9-2").is_err());
    }
}
