//! Table extraction pipeline
//!
//! Drives one page image through the full extraction flow:
//!
//! 1. **Detect**: find table boxes with a [`Detector`] and keep confident ones
//! 2. **Extract content**: crop each table (with padding), tile it and ask a
//!    [`Transcriber`] for markdown, then parse the text into tables
//! 3. **Persist**: write one `output_<variant>_<timestamp>.json` artifact
//!
//! A page without tables ends after detection with an empty result and no
//! artifact. The [`Variant`] picks the transcription prompt and the JSON
//! shape of the persisted tables.
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use table_extract_common::TracingLogger;
//! use table_extract_pipeline::{PipelineConfig, ReplayDetector, ReplayTranscriber, TableExtractor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::load(Path::new("config.json"))?;
//! let detector = ReplayDetector::from_json(&std::fs::read_to_string("detections.json")?)?;
//! let transcriber = ReplayTranscriber::from_json(&std::fs::read_to_string("transcripts.json")?)?;
//!
//! let mut extractor = TableExtractor::new(config, detector, transcriber, TracingLogger::shared())?;
//! let outcome = extractor.run()?;
//! println!("{} tables from {} detections", outcome.tables.len(), outcome.detected_tables);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod orchestrator;
pub mod output;
pub mod replay;
pub mod transcribe;

pub use config::{ConfigError, PipelineConfig};
pub use orchestrator::{ExtractionOutcome, PipelineState, TableExtractor};
pub use output::{shape_table, ExtractionArtifact};
pub use replay::{ReplayDetector, ReplayTranscriber};
pub use table_extract_detection::{Detection, Detector, LabelMap};
pub use table_extract_common::ModelOptions;
pub use transcribe::{Transcriber, TranscriptionError, TranscriptionRequest, Variant};

use std::path::PathBuf;
use table_extract_detection::DetectionError;
use table_extract_tiling::TilingError;
use thiserror::Error;

/// Errors that end a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Tiling(#[from] TilingError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
