//! Line classification as a per-page state machine.
//!
//! Each page starts from a fresh [`ScanState`]. [`LineClassifier::step`]
//! consumes one raw line and returns the next state plus any blocks that
//! became complete. Table and list lines accumulate in the state and are
//! flushed on a blank line, on a line of an incompatible kind, and by
//! [`LineClassifier::finish`] at the end of the page. Only one of the two
//! buffers is ever non-empty.

use regex::Regex;

use super::list_builder::{ListBuilder, ListLine};
use super::table_builder::TableBuilder;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::{Block, ListItem};

/// Substrings that mark a table-of-contents page.
pub const TOC_INDICATORS: &[&str] = &["table of contents", "contents", "page", "chapter", "section"];

/// Number of leading lines inspected for TOC indicators.
pub const TOC_PROBE_LINES: usize = 5;

/// Words that make a line a (weak) level-2 heading.
pub const HEADING_KEYWORDS: &[&str] = &[
    "overview",
    "background",
    "description",
    "summary",
    "findings",
    "resources",
];

/// Which heading rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingRule {
    /// Line starts with `## `
    MarkerLevel2,
    /// Line starts with `### `
    MarkerLevel3,
    /// Capital letters and spaces, at least 11 characters
    AllCaps,
    /// Capital then lowercase and spaces, at least 11 characters
    TitleCase,
    /// Capital then lowercase and spaces, at least 6 characters
    ShortTitleCase,
    /// Ends with `:`
    TrailingColon,
    /// Ends with `.`
    TrailingPeriod,
    /// Contains a heading keyword
    Keyword,
}

impl HeadingRule {
    /// Heading level assigned by the rule.
    pub fn level(&self) -> u8 {
        match self {
            HeadingRule::AllCaps => 1,
            HeadingRule::MarkerLevel2 | HeadingRule::TitleCase | HeadingRule::Keyword => 2,
            HeadingRule::MarkerLevel3
            | HeadingRule::ShortTitleCase
            | HeadingRule::TrailingColon
            | HeadingRule::TrailingPeriod => 3,
        }
    }

    /// Whether the rule is a guess that deserves a warning.
    pub fn is_low_confidence(&self) -> bool {
        matches!(
            self,
            HeadingRule::TrailingColon | HeadingRule::TrailingPeriod | HeadingRule::Keyword
        )
    }

    /// Short rule name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            HeadingRule::MarkerLevel2 => "marker_level_2",
            HeadingRule::MarkerLevel3 => "marker_level_3",
            HeadingRule::AllCaps => "all_caps",
            HeadingRule::TitleCase => "title_case",
            HeadingRule::ShortTitleCase => "short_title_case",
            HeadingRule::TrailingColon => "trailing_colon",
            HeadingRule::TrailingPeriod => "trailing_period",
            HeadingRule::Keyword => "keyword",
        }
    }
}

/// Classification of a single trimmed line, ignoring page state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty after trimming
    Blank,
    /// A heading
    Heading {
        /// Rule that fired
        rule: HeadingRule,
        /// Heading text with any explicit marker removed
        text: String,
    },
    /// A bullet or numbered list line
    List(ListLine),
    /// Whitespace-aligned text
    TableRow,
    /// A bullet marker with no content; discarded
    Skip,
    /// Anything else
    Text,
}

/// Per-page scanning state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanState {
    /// A table is being collected
    pub in_table: bool,

    /// A list is being collected
    pub in_list: bool,

    /// Lines are skipped until a long heading appears
    pub skip_toc: bool,

    /// Collected table lines (trimmed)
    pub table_buffer: Vec<String>,

    /// Collected list items
    pub list_buffer: Vec<ListItem>,

    /// Title of the most recent level-2 heading
    pub section: Option<String>,
}

impl ScanState {
    /// Create the state for a page, with TOC skipping set from its lines.
    pub fn for_page<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            skip_toc: toc_detected(lines),
            ..Default::default()
        }
    }

    /// Check whether any buffer holds pending lines.
    pub fn has_pending(&self) -> bool {
        !self.table_buffer.is_empty() || !self.list_buffer.is_empty()
    }
}

/// Check the first lines of a page for table-of-contents indicators.
pub fn toc_detected<S: AsRef<str>>(lines: &[S]) -> bool {
    let probe = lines
        .iter()
        .take(TOC_PROBE_LINES)
        .map(|line| line.as_ref().trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    TOC_INDICATORS.iter().any(|indicator| probe.contains(indicator))
}

/// Line classifier.
pub struct LineClassifier {
    all_caps_regex: Regex,
    title_case_regex: Regex,
    short_title_regex: Regex,
    lists: ListBuilder,
    tables: TableBuilder,
}

impl LineClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self {
            all_caps_regex: Regex::new(r"^[A-Z][A-Z\s]{10,}$").unwrap(),
            title_case_regex: Regex::new(r"^[A-Z][a-z\s]{10,}$").unwrap(),
            short_title_regex: Regex::new(r"^[A-Z][a-z\s]{5,}$").unwrap(),
            lists: ListBuilder::new(),
            tables: TableBuilder::new(),
        }
    }

    /// Check for the all-caps or title-case heading shapes that end a TOC.
    pub fn is_long_heading(&self, line: &str) -> bool {
        self.all_caps_regex.is_match(line) || self.title_case_regex.is_match(line)
    }

    /// Apply the heading rules to a trimmed line; first hit wins.
    pub fn detect_heading(&self, line: &str) -> Option<(HeadingRule, String)> {
        if let Some(rest) = line.strip_prefix("## ") {
            return Some((HeadingRule::MarkerLevel2, rest.trim().to_string()));
        }
        if let Some(rest) = line.strip_prefix("### ") {
            return Some((HeadingRule::MarkerLevel3, rest.trim().to_string()));
        }

        let rule = if self.all_caps_regex.is_match(line) {
            HeadingRule::AllCaps
        } else if self.title_case_regex.is_match(line) {
            HeadingRule::TitleCase
        } else if self.short_title_regex.is_match(line) {
            HeadingRule::ShortTitleCase
        } else if line.ends_with(':') {
            HeadingRule::TrailingColon
        } else if line.ends_with('.') {
            HeadingRule::TrailingPeriod
        } else {
            let lower = line.to_lowercase();
            if HEADING_KEYWORDS.iter().any(|word| lower.contains(word)) {
                HeadingRule::Keyword
            } else {
                return None;
            }
        };

        Some((rule, line.to_string()))
    }

    /// Classify a line on its own, without page state.
    pub fn classify(&self, line: &str) -> LineKind {
        let line = line.trim();
        if line.is_empty() {
            return LineKind::Blank;
        }
        if let Some((rule, text)) = self.detect_heading(line) {
            return LineKind::Heading { rule, text };
        }
        if let Some(list_line) = self.lists.parse(line) {
            return match list_line {
                ListLine::Bullet { ref content, .. } if content.is_empty() => LineKind::Skip,
                list_line => LineKind::List(list_line),
            };
        }
        if line.contains("  ") || line.contains('\t') {
            return LineKind::TableRow;
        }
        LineKind::Text
    }

    /// Consume one raw line.
    pub fn step(
        &self,
        mut state: ScanState,
        raw_line: &str,
        page: u32,
        diagnostics: &mut Diagnostics,
    ) -> (ScanState, Vec<Block>) {
        let mut blocks = Vec::new();
        let line = raw_line.trim();

        if line.is_empty() {
            self.flush_table(&mut state, page, diagnostics, &mut blocks);
            flush_list(&mut state, &mut blocks);
            return (state, blocks);
        }

        if state.skip_toc {
            if !self.is_long_heading(line) {
                return (state, blocks);
            }
            state.skip_toc = false;
            diagnostics.push(
                page,
                DiagnosticKind::TocSkipEnded {
                    line: line.to_string(),
                },
            );
        }

        match self.classify(line) {
            LineKind::Blank => {}
            LineKind::Heading { rule, text } => {
                self.flush_table(&mut state, page, diagnostics, &mut blocks);
                flush_list(&mut state, &mut blocks);

                let level = rule.level();
                if rule.is_low_confidence() {
                    diagnostics.push(
                        page,
                        DiagnosticKind::LowConfidenceHeading {
                            rule: rule.name().to_string(),
                            level,
                            line: line.to_string(),
                        },
                    );
                }
                if level == 2 {
                    diagnostics.push(page, DiagnosticKind::SectionStarted { title: text.clone() });
                    state.section = Some(text.clone());
                }
                blocks.push(Block::heading(level, text));
            }
            LineKind::List(list_line) => {
                self.flush_table(&mut state, page, diagnostics, &mut blocks);
                if let Some(item) = list_line.into_item() {
                    state.list_buffer.push(item);
                    state.in_list = true;
                }
            }
            LineKind::Skip => {
                self.flush_table(&mut state, page, diagnostics, &mut blocks);
            }
            LineKind::TableRow => {
                flush_list(&mut state, &mut blocks);
                if !state.in_table {
                    diagnostics.push(
                        page,
                        DiagnosticKind::TableAssumed {
                            line: line.to_string(),
                        },
                    );
                    state.in_table = true;
                }
                state.table_buffer.push(line.to_string());
            }
            LineKind::Text => {
                self.flush_table(&mut state, page, diagnostics, &mut blocks);

                let continues = state.in_list
                    && !state.list_buffer.is_empty()
                    && raw_line.starts_with(char::is_whitespace);
                if continues {
                    if let Some(last) = state.list_buffer.last_mut() {
                        last.append(line);
                    }
                } else {
                    flush_list(&mut state, &mut blocks);
                    blocks.push(Block::paragraph(line));
                }
            }
        }

        (state, blocks)
    }

    /// Flush whatever the state still holds at the end of a page.
    pub fn finish(&self, mut state: ScanState, page: u32, diagnostics: &mut Diagnostics) -> Vec<Block> {
        let mut blocks = Vec::new();
        self.flush_table(&mut state, page, diagnostics, &mut blocks);
        flush_list(&mut state, &mut blocks);
        blocks
    }

    /// Classify all lines of a page's text.
    pub fn classify_page(&self, text: &str, page: u32, diagnostics: &mut Diagnostics) -> Vec<Block> {
        let lines: Vec<&str> = text.lines().collect();
        let mut state = ScanState::for_page(&lines);
        if state.skip_toc {
            diagnostics.push(page, DiagnosticKind::TocSkipStarted);
        }

        let mut blocks = Vec::new();
        for line in &lines {
            let (next, emitted) = self.step(state, line, page, diagnostics);
            state = next;
            blocks.extend(emitted);
        }
        blocks.extend(self.finish(state, page, diagnostics));
        blocks
    }

    fn flush_table(
        &self,
        state: &mut ScanState,
        page: u32,
        diagnostics: &mut Diagnostics,
        blocks: &mut Vec<Block>,
    ) {
        state.in_table = false;
        let lines = std::mem::take(&mut state.table_buffer);
        if let Some(table) = self.tables.build(&lines, page, diagnostics) {
            blocks.push(Block::Table(table));
        }
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn flush_list(state: &mut ScanState, blocks: &mut Vec<Block>) {
    state.in_list = false;
    if let Some(block) = ListBuilder::build(std::mem::take(&mut state.list_buffer)) {
        blocks.push(block);
    }
}
