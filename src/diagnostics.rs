//! Diagnostic events collected during a conversion.
//!
//! Every heuristic decision, redaction and recovered failure is recorded as
//! a [`Diagnostic`] and returned with the result. Each event is also
//! forwarded to the `log` facade when it is pushed, so a binary that
//! installs a logger sees the same stream.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Trace-level detail
    Debug,
    /// Informational
    Info,
    /// Low-confidence guess or recovered failure
    Warning,
}

/// What kind of redaction produced a [`DiagnosticKind::Redaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionKind {
    /// Email address
    Email,
    /// URL outside the allow-list
    Website,
    /// Company-like token
    Company,
}

/// A single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A span of text was replaced by a placeholder.
    Redaction {
        /// Which pass matched
        kind: RedactionKind,
        /// The literal text that was removed
        matched: String,
    },
    /// The collaborator supplied no text for the page.
    PageTextMissing,
    /// The page looks like a table of contents; lines are being skipped.
    TocSkipStarted,
    /// The TOC region ended at this line.
    TocSkipEnded {
        /// Line that released the skip
        line: String,
    },
    /// A heading was accepted on a weak heuristic.
    LowConfidenceHeading {
        /// Rule that fired
        rule: String,
        /// Heading level assigned
        level: u8,
        /// The line
        line: String,
    },
    /// A level-2 heading opened a new section.
    SectionStarted {
        /// Section title
        title: String,
    },
    /// Whitespace-separated text was assumed to be a table.
    TableAssumed {
        /// First line of the table
        line: String,
    },
    /// A table row was dropped because its width differs from the header.
    TableRowDropped {
        /// Header cell count
        expected: usize,
        /// Row cell count
        found: usize,
        /// The dropped cells
        cells: Vec<String>,
    },
    /// A raster object could not be recovered.
    ImageSkipped {
        /// Position of the object on its page (0-based)
        object_index: usize,
        /// Failure description
        reason: String,
    },
    /// Raw pixel reconstruction was used for a Flate object.
    RawReconstruction {
        /// Position of the object on its page (0-based)
        object_index: usize,
        /// Color space used
        color_space: String,
    },
    /// The soft mask was ignored.
    MaskIgnored {
        /// Position of the object on its page (0-based)
        object_index: usize,
        /// Failure description
        reason: String,
    },
    /// The ICC profile was ignored.
    IccProfileIgnored {
        /// Position of the object on its page (0-based)
        object_index: usize,
        /// Failure description
        reason: String,
    },
    /// An image asset was written.
    ImageSaved {
        /// File name of the asset
        file_name: String,
    },
}

impl DiagnosticKind {
    /// Default severity for this kind of event.
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::Redaction { .. }
            | DiagnosticKind::TocSkipStarted
            | DiagnosticKind::TocSkipEnded { .. }
            | DiagnosticKind::SectionStarted { .. }
            | DiagnosticKind::ImageSaved { .. } => Severity::Info,
            DiagnosticKind::RawReconstruction { .. } => Severity::Debug,
            DiagnosticKind::PageTextMissing
            | DiagnosticKind::LowConfidenceHeading { .. }
            | DiagnosticKind::TableAssumed { .. }
            | DiagnosticKind::TableRowDropped { .. }
            | DiagnosticKind::ImageSkipped { .. }
            | DiagnosticKind::MaskIgnored { .. }
            | DiagnosticKind::IccProfileIgnored { .. } => Severity::Warning,
        }
    }

    fn describe(&self) -> String {
        match self {
            DiagnosticKind::Redaction { kind, matched } => {
                format!("redacted {:?}: {}", kind, matched)
            }
            DiagnosticKind::PageTextMissing => "no text supplied for page".to_string(),
            DiagnosticKind::TocSkipStarted => {
                "table of contents detected, skipping lines".to_string()
            }
            DiagnosticKind::TocSkipEnded { line } => {
                format!("table of contents ended at: {}", line)
            }
            DiagnosticKind::LowConfidenceHeading { rule, level, line } => {
                format!("assumed heading level {} ({}): {}", level, rule, line)
            }
            DiagnosticKind::SectionStarted { title } => format!("new section: {}", title),
            DiagnosticKind::TableAssumed { line } => {
                format!("treating whitespace-aligned text as table: {}", line)
            }
            DiagnosticKind::TableRowDropped {
                expected,
                found,
                cells,
            } => format!(
                "dropped table row with {} cells (header has {}): {:?}",
                found, expected, cells
            ),
            DiagnosticKind::ImageSkipped {
                object_index,
                reason,
            } => format!("skipped image object {}: {}", object_index, reason),
            DiagnosticKind::RawReconstruction {
                object_index,
                color_space,
            } => format!(
                "rebuilt image object {} from raw {} samples",
                object_index, color_space
            ),
            DiagnosticKind::MaskIgnored {
                object_index,
                reason,
            } => format!("soft mask of object {} ignored: {}", object_index, reason),
            DiagnosticKind::IccProfileIgnored {
                object_index,
                reason,
            } => format!("ICC profile of object {} ignored: {}", object_index, reason),
            DiagnosticKind::ImageSaved { file_name } => format!("saved image {}", file_name),
        }
    }
}

/// An event tied to the page it occurred on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Page number (1-indexed)
    pub page: u32,

    /// Severity
    pub severity: Severity,

    /// The event
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Human-readable message.
    pub fn message(&self) -> String {
        format!("page {}: {}", self.page, self.kind.describe())
    }
}

/// Collected diagnostics for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    events: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and forward it to the logger.
    pub fn push(&mut self, page: u32, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            page,
            severity: kind.severity(),
            kind,
        };
        match diagnostic.severity {
            Severity::Debug => log::debug!("{}", diagnostic.message()),
            Severity::Info => log::info!("{}", diagnostic.message()),
            Severity::Warning => log::warn!("{}", diagnostic.message()),
        }
        self.events.push(diagnostic);
    }

    /// All events in the order they were recorded.
    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    /// Events at or above the given severity.
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.events.iter().filter(move |d| d.severity >= severity)
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append another sink's events.
    pub fn extend(&mut self, other: Diagnostics) {
        self.events.extend(other.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_severity() {
        let mut diags = Diagnostics::new();
        diags.push(1, DiagnosticKind::TocSkipStarted);
        diags.push(
            2,
            DiagnosticKind::TableRowDropped {
                expected: 3,
                found: 2,
                cells: vec!["a".into(), "b".into()],
            },
        );

        assert_eq!(diags.len(), 2);
        assert_eq!(diags.events()[0].severity, Severity::Info);
        assert_eq!(diags.events()[1].severity, Severity::Warning);
        assert_eq!(diags.at_least(Severity::Warning).count(), 1);
    }

    #[test]
    fn test_message_includes_page() {
        let mut diags = Diagnostics::new();
        diags.push(
            4,
            DiagnosticKind::Redaction {
                kind: RedactionKind::Email,
                matched: "a@b.io".into(),
            },
        );
        let msg = diags.events()[0].message();
        assert!(msg.starts_with("page 4"));
        assert!(msg.contains("a@b.io"));
    }

    #[test]
    fn test_serialize_flattened() {
        let mut diags = Diagnostics::new();
        diags.push(1, DiagnosticKind::PageTextMissing);
        let json = serde_json::to_string(&diags.events()[0]).unwrap();
        assert!(json.contains("\"event\":\"page_text_missing\""));
        assert!(json.contains("\"severity\":\"warning\""));
    }
}
