//! Evaluate command implementation

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use table_extract_common::TracingLogger;
use table_extract_evaluation::{load_records, EvaluationHarness};

#[derive(Args)]
pub struct EvaluateCommand {
    /// Results file: JSON object of image id -> predictions and timings
    #[arg(value_name = "FILE")]
    results: PathBuf,

    /// Also print averages per archetype
    #[arg(long)]
    grouped: bool,
}

impl EvaluateCommand {
    pub fn execute(self) -> Result<()> {
        let records = load_records(&self.results)
            .with_context(|| format!("Failed to load results: {}", self.results.display()))?;

        let table = EvaluationHarness::new(TracingLogger::shared()).evaluate(&records);
        print!("{}", table.to_markdown());

        if self.grouped {
            println!();
            print!("{}", table.group_averages_markdown());
        }
        Ok(())
    }
}
