//! Tolerant markdown-table parser for transcription output
//!
//! Transcription models emit tables as loosely formatted pipe-delimited text,
//! often with ragged rows, missing outer pipes or stray prose in between.
//! [`TableTextParser`] recovers every table it can from such text:
//!
//! 1. Split the text into blocks of consecutive delimiter-bearing lines
//! 2. Right-pad short lines so every line carries the same cell count
//! 3. Detect a header from a `|---|---|` style separator line
//! 4. Split fields on the delimiter and trim them
//! 5. Fill missing cells, drop columns that are empty in every row
//!
//! A block that cannot be parsed is logged and skipped; it never aborts the
//! remaining blocks.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use table_extract_common::MemoryLogger;
//! use table_extract_parser::TableTextParser;
//!
//! let parser = TableTextParser::new(Arc::new(MemoryLogger::new()));
//! let tables = parser.parse("| a | b |\n|---|---|\n| 1 | 2 |");
//! assert_eq!(tables.len(), 1);
//! assert_eq!(tables[0].header.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
//! assert_eq!(tables[0].rows, vec![vec!["1".to_string(), "2".to_string()]]);
//! ```

pub mod block;
pub mod table;

pub use block::{segment_blocks, TextBlock};
pub use table::ParsedTable;

use table_extract_common::SharedLogger;
use thiserror::Error;

/// Default field delimiter of markdown tables
pub const DEFAULT_DELIMITER: char = '|';

/// Reasons a single block is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),

    #[error("Block contains no rows")]
    EmptyBlock,

    #[error("Block contains only empty cells")]
    NoContent,

    #[error("Malformed block: {0}")]
    Malformed(String),
}

/// Parses raw transcription text into tables
pub struct TableTextParser {
    delimiter: char,
    logger: SharedLogger,
}

impl TableTextParser {
    /// Parser for `|`-delimited markdown tables
    #[must_use]
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            logger,
        }
    }

    /// Parser for another single-byte delimiter
    pub fn with_delimiter(delimiter: char, logger: SharedLogger) -> Result<Self, ParseError> {
        if !delimiter.is_ascii() || delimiter.is_ascii_whitespace() || delimiter == '-' {
            return Err(ParseError::InvalidDelimiter(delimiter));
        }
        Ok(Self { delimiter, logger })
    }

    #[must_use]
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Extract every parseable table from `raw_text`, in order of appearance
    #[must_use]
    pub fn parse(&self, raw_text: &str) -> Vec<ParsedTable> {
        let blocks = segment_blocks(raw_text, self.delimiter);
        let mut tables = Vec::with_capacity(blocks.len());

        for (index, block) in blocks.iter().enumerate() {
            match self.parse_block(block) {
                Ok(table) => tables.push(table),
                Err(e) => self.logger.warn(&format!(
                    "Skipping table block {index} starting at line {}: {e}",
                    block.first_line + 1
                )),
            }
        }

        self.logger.debug(&format!(
            "Parsed {} of {} table blocks",
            tables.len(),
            blocks.len()
        ));
        tables
    }

    /// Parse a single block into a uniform table
    pub fn parse_block(&self, block: &TextBlock) -> Result<ParsedTable, ParseError> {
        let delimiter = self.delimiter;
        let max_cells = block
            .lines
            .iter()
            .map(|line| cell_count(line, delimiter))
            .max()
            .ok_or(ParseError::EmptyBlock)?;

        let has_header = block
            .lines
            .iter()
            .any(|line| is_separator_line(line, delimiter));

        let body: Vec<String> = block
            .lines
            .iter()
            .filter(|line| !(has_header && is_separator_line(line, delimiter)))
            .map(|line| {
                let padded = pad_line(line, delimiter, max_cells);
                if has_header {
                    strip_outer_delimiters(&padded, delimiter).to_string()
                } else {
                    padded
                }
            })
            .collect();

        let mut rows = read_rows(&body.join("\n"), delimiter)?;
        if rows.is_empty() {
            return Err(ParseError::EmptyBlock);
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }

        let keep: Vec<usize> = (0..width)
            .filter(|&col| rows.iter().any(|row| !row[col].is_empty()))
            .collect();
        if keep.is_empty() {
            return Err(ParseError::NoContent);
        }

        let mut rows: Vec<Vec<String>> = rows
            .into_iter()
            .map(|row| keep.iter().map(|&col| row[col].clone()).collect())
            .collect();

        let header = if has_header {
            Some(rows.remove(0))
        } else {
            None
        };

        Ok(ParsedTable { header, rows })
    }
}

/// Cells strictly between the first and last delimiter of a line
fn cell_count(line: &str, delimiter: char) -> usize {
    line.split(delimiter).count().saturating_sub(2)
}

/// Append empty trailing cells until the line holds `target` cells
fn pad_line(line: &str, delimiter: char, target: usize) -> String {
    let missing = target.saturating_sub(cell_count(line, delimiter));
    let mut padded = String::with_capacity(line.len() + missing * 2);
    padded.push_str(line);
    for _ in 0..missing {
        padded.push(' ');
        padded.push(delimiter);
    }
    padded
}

/// Header separator: only delimiters, hyphens and whitespace
fn is_separator_line(line: &str, delimiter: char) -> bool {
    line.chars()
        .all(|c| c == delimiter || c == '-' || c.is_whitespace())
}

fn strip_outer_delimiters(line: &str, delimiter: char) -> &str {
    let line = line.trim();
    let line = line.strip_prefix(delimiter).unwrap_or(line);
    line.strip_suffix(delimiter).unwrap_or(line)
}

/// Split delimited text into trimmed fields, one record per line.
///
/// Quotes are literal text, so a stray `"` never joins lines.
fn read_rows(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ParseError::Malformed(e.to_string()))?;
        rows.push(record.iter().map(ToString::to_string).collect());
    }
    Ok(rows)
}
