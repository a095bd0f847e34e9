//! Pipeline comparison against ground truth
//!
//! Scores the transcriptions of pipeline A and pipeline B against the
//! ground-truth text of every image with bag-of-words cosine similarity,
//! next to the time each pipeline took.
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use table_extract_common::TracingLogger;
//! use table_extract_evaluation::{load_records, EvaluationHarness};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let records = load_records(Path::new("results.json"))?;
//! let table = EvaluationHarness::new(TracingLogger::shared()).evaluate(&records);
//! println!("{}", table.to_markdown());
//! # Ok(())
//! # }
//! ```

pub mod record;
pub mod report;
pub mod similarity;

pub use record::{load_records, parse_records, EvaluationRecord};
pub use report::{
    format_general, render_pipe_table, ComparisonRow, ComparisonTable, GroupAverage,
    COMPARISON_HEADERS, UNGROUPED,
};
pub use similarity::{cosine_similarity, tokenize};

use std::path::PathBuf;
use table_extract_common::SharedLogger;
use thiserror::Error;

/// Errors raised while loading evaluation input
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Failed to read results file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse results: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid record '{id}': {reason}")]
    InvalidRecord { id: String, reason: String },
}


/// Builds the comparison table for a set of records
pub struct EvaluationHarness {
    logger: SharedLogger,
}

impl EvaluationHarness {
    #[must_use]
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }

    /// One row per record, in input order
    #[must_use]
    pub fn evaluate(&self, records: &[EvaluationRecord]) -> ComparisonTable {
        let rows: Vec<ComparisonRow> = records
            .iter()
            .map(|record| {
                let row = ComparisonRow {
                    image: record.id.clone(),
                    similarity_a: cosine_similarity(&record.actual, &record.pred_pipeline_a),
                    similarity_b: cosine_similarity(&record.actual, &record.pred_pipeline_b),
                    time_a: record.time_pipeline_a,
                    time_b: record.time_pipeline_b,
                    archetype: record.archetype.clone(),
                };
                self.logger.debug(&format!(
                    "{}: similarity A={:.4} B={:.4}",
                    row.image, row.similarity_a, row.similarity_b
                ));
                row
            })
            .collect();

        self.logger
            .info(&format!("Evaluated {} records", rows.len()));
        ComparisonTable { rows }
    }
}
