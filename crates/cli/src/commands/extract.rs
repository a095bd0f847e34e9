//! Extract command implementation

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use table_extract_common::TracingLogger;
use table_extract_pipeline::{PipelineConfig, ReplayDetector, ReplayTranscriber, TableExtractor};
use tracing::info;

#[derive(Args)]
pub struct ExtractCommand {
    /// Pipeline configuration file (JSON)
    #[arg(short, long, default_value = "./config.json")]
    config: PathBuf,

    /// Recorded detector output for the page (JSON)
    #[arg(long, value_name = "FILE")]
    detections: PathBuf,

    /// Recorded transcriptions, one per kept table (JSON array of strings)
    #[arg(long, value_name = "FILE")]
    transcripts: PathBuf,

    /// Override the configured output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl ExtractCommand {
    /// Load and validate the configuration, applying command-line overrides
    pub fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(&self.config)
            .with_context(|| format!("Failed to load config: {}", self.config.display()))?;
        if let Some(output_dir) = &self.output_dir {
            config.output_path.clone_from(output_dir);
        }
        Ok(config)
    }

    pub fn execute(self, config: PipelineConfig) -> Result<()> {
        let detections = std::fs::read_to_string(&self.detections).with_context(|| {
            format!("Failed to read detections: {}", self.detections.display())
        })?;
        let detector = ReplayDetector::from_json(&detections)?;

        let transcripts = std::fs::read_to_string(&self.transcripts).with_context(|| {
            format!("Failed to read transcripts: {}", self.transcripts.display())
        })?;
        let transcriber = ReplayTranscriber::from_json(&transcripts)?;

        let mut extractor =
            TableExtractor::new(config, detector, transcriber, TracingLogger::shared())?;
        let outcome = extractor.run()?;

        info!(
            "Extracted {} tables from {} detections",
            outcome.tables.len(),
            outcome.detected_tables
        );

        for (index, table) in outcome.tables.iter().enumerate() {
            println!("Table {index}:");
            println!("{}", table.to_markdown());
        }
        match &outcome.artifact_path {
            Some(path) => println!("Output written to {}", path.display()),
            None => println!("No tables found"),
        }
        Ok(())
    }
}
