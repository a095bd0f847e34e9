//! Transcription seam and the two extraction variants

use ndarray::Array4;
use serde::{Deserialize, Serialize};
use table_extract_common::ModelOptions;
use table_extract_tiling::{pixel_values, Tile};
use thiserror::Error;

/// Errors surfaced by a [`Transcriber`]
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Transcription model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("No recorded transcription left (consumed {consumed})")]
    Exhausted { consumed: usize },
}

/// Model input for the tiles of a single crop
#[derive(Debug, Clone)]
pub struct TranscriptionRequest<'a> {
    /// Tiles in reading order
    pub tiles: &'a [Tile],
    /// Normalized `(N, 3, S, S)` batch built from `tiles`
    pub pixel_values: Array4<f32>,
    pub prompt: &'a str,
    pub max_new_tokens: usize,
}

impl<'a> TranscriptionRequest<'a> {
    /// Build the request, stacking `tiles` into `tile_size` square inputs
    #[must_use]
    pub fn new(
        tiles: &'a [Tile],
        tile_size: u32,
        prompt: &'a str,
        max_new_tokens: usize,
    ) -> Self {
        Self {
            tiles,
            pixel_values: pixel_values(tiles, tile_size),
            prompt,
            max_new_tokens,
        }
    }
}

/// Vision-language model turning tiles of one table into text
pub trait Transcriber {
    /// Load or configure the model before the first table; no-op by default
    fn prepare(&mut self, options: &ModelOptions) -> Result<(), TranscriptionError> {
        let _ = options;
        Ok(())
    }

    /// Generate at most `request.max_new_tokens` tokens of text for one crop
    fn transcribe(
        &mut self,
        request: &TranscriptionRequest<'_>,
    ) -> Result<String, TranscriptionError>;
}

const PIPELINE_A_PROMPT: &str = "<image>\nExtract the table in this image as a markdown table. \
Use the first row of the table as the column headers and keep every cell value exactly as written.";

const PIPELINE_B_PROMPT: &str = "<image>\nTranscribe the table in this image into markdown. \
Write one markdown row per table row, in reading order, with a header separator line only if \
the table has column headers.";

/// Content extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Header-keyed records per table
    PipelineA,
    /// Column list plus row matrix per table
    PipelineB,
}

impl Variant {
    #[must_use]
    pub fn from_flag(use_pipeline_a: bool) -> Self {
        if use_pipeline_a {
            Self::PipelineA
        } else {
            Self::PipelineB
        }
    }

    /// Name used in artifact file names and logs
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PipelineA => "pipeline_a",
            Self::PipelineB => "pipeline_b",
        }
    }

    /// Instruction sent to the transcriber with every crop
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Self::PipelineA => PIPELINE_A_PROMPT,
            Self::PipelineB => PIPELINE_B_PROMPT,
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
