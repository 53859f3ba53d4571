//! Pipe table reconstruction from whitespace-aligned lines.

use regex::Regex;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::{Table, TableRow};

/// Builds tables from buffered lines.
///
/// Cells are separated by two or more whitespace characters or a tab. The
/// first non-empty row is the header; data rows of a different width are
/// dropped and reported.
pub struct TableBuilder {
    split_regex: Regex,
}

impl TableBuilder {
    /// Create a new table builder.
    pub fn new() -> Self {
        Self {
            split_regex: Regex::new(r"\s{2,}|\t").unwrap(),
        }
    }

    /// Split one line into trimmed, non-empty cells.
    pub fn split_cells(&self, line: &str) -> Vec<String> {
        self.split_regex
            .split(line)
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Build a table from buffered lines.
    ///
    /// Returns `None` when no line yields any cell.
    pub fn build<S: AsRef<str>>(
        &self,
        lines: &[S],
        page: u32,
        diagnostics: &mut Diagnostics,
    ) -> Option<Table> {
        let mut rows = lines
            .iter()
            .map(|line| self.split_cells(line.as_ref()))
            .filter(|cells| !cells.is_empty());

        let header = rows.next()?;
        log::debug!("page {}: using first row as table header: {:?}", page, header);
        let mut table = Table::new(TableRow::new(header));

        for cells in rows {
            if let Err(row) = table.push_row(TableRow::new(cells)) {
                diagnostics.push(
                    page,
                    DiagnosticKind::TableRowDropped {
                        expected: table.column_count(),
                        found: row.cells.len(),
                        cells: row.cells,
                    },
                );
            }
        }

        Some(table)
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
