//! Structured table produced by the parser

use serde::{Deserialize, Serialize};

/// Flat table reconstructed from one text block.
///
/// The header (when present) and every data row have the same cell count.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    #[must_use]
    pub fn has_header(&self) -> bool {
        self.header.is_some()
    }

    /// Cell count shared by the header and all rows
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.header
            .as_ref()
            .or_else(|| self.rows.first())
            .map_or(0, Vec::len)
    }

    /// Number of data rows (header excluded)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render as a pipe table, emitting a separator line after the header
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            push_row(&mut out, header);
            let separator: Vec<String> = header.iter().map(|_| "---".to_string()).collect();
            push_row(&mut out, &separator);
        }
        for row in &self.rows {
            push_row(&mut out, row);
        }
        out
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(cell);
        out.push_str(" |");
    }
    out.push('\n');
}
