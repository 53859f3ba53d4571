//! Redaction of contact details and company references.

use std::ops::Range;

use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use super::SanitizeOptions;
use crate::diagnostics::{DiagnosticKind, Diagnostics, RedactionKind};

/// Placeholder for email addresses.
pub const EMAIL_PLACEHOLDER: &str = "[email]";

/// Placeholder for non-allowed website links.
pub const WEBSITE_PLACEHOLDER: &str = "[company website]";

/// Placeholder for company names and domains.
pub const COMPANY_PLACEHOLDER: &str = "[Company]";

/// Page text sanitizer.
///
/// Runs three ordered passes (emails, websites, company names) and records
/// every replaced span as a redaction diagnostic. Applying it twice yields
/// the same text as applying it once.
pub struct Sanitizer {
    options: SanitizeOptions,
    email_regex: Regex,
    url_regex: Regex,
    company_regex: Regex,
    ligature_map: Vec<(&'static str, &'static str)>,
}

impl Sanitizer {
    /// Create a sanitizer with the given options.
    pub fn new(options: SanitizeOptions) -> Self {
        Self {
            options,
            email_regex: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap(),
            url_regex: Regex::new(r"https?://([a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,})")
                .unwrap(),
            company_regex: Regex::new(
                r"\b[A-Z][a-zA-Z]+\.(?:com|org|net|io|ai|tech)\b|\b[A-Z][a-zA-Z]+ (?:Inc\.|LLC\b|Ltd\.|Corporation\b|Corp\.)",
            )
            .unwrap(),
            ligature_map: vec![
                ("\u{FB00}", "ff"),
                ("\u{FB01}", "fi"),
                ("\u{FB02}", "fl"),
                ("\u{FB03}", "ffi"),
                ("\u{FB04}", "ffl"),
                ("\u{FB05}", "st"),
                ("\u{FB06}", "st"),
            ],
        }
    }

    /// Get the options in use.
    pub fn options(&self) -> &SanitizeOptions {
        &self.options
    }

    /// Sanitize one page of text.
    pub fn sanitize(&self, page: u32, text: &str, diagnostics: &mut Diagnostics) -> String {
        let mut result = self.normalize(text);

        result = self
            .email_regex
            .replace_all(&result, |caps: &Captures| {
                record(diagnostics, page, RedactionKind::Email, &caps[0]);
                EMAIL_PLACEHOLDER
            })
            .into_owned();

        result = self
            .url_regex
            .replace_all(&result, |caps: &Captures| {
                if self.options.is_host_allowed(&caps[1]) {
                    caps[0].to_string()
                } else {
                    record(diagnostics, page, RedactionKind::Website, &caps[0]);
                    WEBSITE_PLACEHOLDER.to_string()
                }
            })
            .into_owned();

        // Links that survived the website pass stay intact, path included.
        let kept = self.kept_links(&result);
        result = self
            .company_regex
            .replace_all(&result, |caps: &Captures| match caps.get(0) {
                Some(m) if kept.iter().any(|span| span.contains(&m.start())) => {
                    m.as_str().to_string()
                }
                _ => {
                    record(diagnostics, page, RedactionKind::Company, &caps[0]);
                    COMPANY_PLACEHOLDER.to_string()
                }
            })
            .into_owned();

        result
    }

    /// Byte spans of allowed links, each running to the next whitespace.
    fn kept_links(&self, text: &str) -> Vec<Range<usize>> {
        self.url_regex
            .captures_iter(text)
            .filter(|caps| self.options.is_host_allowed(&caps[1]))
            .filter_map(|caps| caps.get(0))
            .map(|m| {
                let end = text[m.end()..]
                    .find(char::is_whitespace)
                    .map_or(text.len(), |i| m.end() + i);
                m.start()..end
            })
            .collect()
    }

    fn normalize(&self, text: &str) -> String {
        let mut result = if self.options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        if self.options.fix_ligatures {
            for (ligature, replacement) in &self.ligature_map {
                result = result.replace(ligature, replacement);
            }
        }

        if self.options.remove_replacement_char {
            result = result.replace('\u{FFFD}', "");
        }

        result
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizeOptions::default())
    }
}

fn record(diagnostics: &mut Diagnostics, page: u32, kind: RedactionKind, matched: &str) {
    diagnostics.push(
        page,
        DiagnosticKind::Redaction {
            kind,
            matched: matched.to_string(),
        },
    );
}
