//! Table types.

use serde::{Deserialize, Serialize};

/// A pipe table: one header row plus data rows of the same width.
///
/// Rows whose width differs from the header are rejected by
/// [`Table::push_row`], so every table that exists is rectangular.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Header row
    pub header: TableRow,

    /// Data rows
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a table with the given header and no data rows.
    pub fn new(header: TableRow) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Append a data row if it has the header's width.
    ///
    /// The rejected row is handed back so the caller can report it.
    pub fn push_row(&mut self, row: TableRow) -> std::result::Result<(), TableRow> {
        if row.cells.len() == self.column_count() {
            self.rows.push(row);
            Ok(())
        } else {
            Err(row)
        }
    }

    /// Get the number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.header.cells.len()
    }

    /// Render as a Markdown pipe table (no trailing newline).
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(self.header.to_markdown());
        lines.push(format!(
            "| {} |",
            vec!["---"; self.column_count()].join(" | ")
        ));
        for row in &self.rows {
            lines.push(row.to_markdown());
        }
        lines.join("\n")
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cell texts, left to right
    pub cells: Vec<String>,
}

impl TableRow {
    /// Create a row from cell texts.
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(Into::into).collect())
    }

    fn to_markdown(&self) -> String {
        format!("| {} |", self.cells.join(" | "))
    }
}
