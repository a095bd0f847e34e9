//! Table detection types and post-processing
//!
//! The detector itself (a table-transformer style model) is an external
//! collaborator behind the [`Detector`] trait. This crate owns what happens
//! around it:
//!
//! - [`DetectionFilter`]: keep "table" detections above a confidence
//!   threshold and pad their boxes
//! - [`crop_padded`]: cut padded regions out of the page, out-of-bounds
//!   areas filled with black
//!
//! # Example
//! ```no_run
//! use table_extract_common::TracingLogger;
//! use table_extract_detection::{crop_padded, Detection, DetectionFilter, LabelMap};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = image::open("page.png")?.to_rgb8();
//! let detections: Vec<Detection> = Vec::new(); // from the model
//! let filter = DetectionFilter::new("table", 0.9, 10, TracingLogger::shared())?;
//!
//! for region in filter.select(&detections, &LabelMap::table_transformer()) {
//!     let crop = crop_padded(&page, &region.padded)?;
//!     println!("table {} score {:.2}: {}x{}", region.index, region.score, crop.width(), crop.height());
//! }
//! # Ok(())
//! # }
//! ```

pub mod crop;
pub mod filter;

pub use crop::{crop_padded, MAX_CROP_SCALE};
pub use filter::{DetectionFilter, TableRegion, DEFAULT_TABLE_LABEL};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use table_extract_common::ModelOptions;
use thiserror::Error;

/// Axis-aligned box in pixel coordinates, serialized as `[x1, y1, x2, y2]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[must_use]
    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[must_use]
    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Grow the box by `padding` pixels on every side. The result may
    /// extend past the image.
    #[must_use]
    pub fn expand(&self, padding: f32) -> Self {
        Self {
            x1: self.x1 - padding,
            y1: self.y1 - padding,
            x2: self.x2 + padding,
            y2: self.y2 + padding,
        }
    }

    #[must_use]
    pub fn to_array(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_array()
    }
}

/// One scored box as produced by the detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Confidence score (0-1)
    pub score: f32,
    /// Class id, resolved through the detector's [`LabelMap`]
    pub label: usize,
    pub bbox: BoundingBox,
}

/// Class id to label name vocabulary of a detection model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    id2label: BTreeMap<usize, String>,
}

impl LabelMap {
    #[must_use]
    pub fn new(id2label: BTreeMap<usize, String>) -> Self {
        Self { id2label }
    }

    /// Labels numbered in order starting from 0
    #[must_use]
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            id2label: names.into_iter().map(Into::into).enumerate().collect(),
        }
    }

    /// Vocabulary of the table-transformer detection checkpoint
    #[must_use]
    pub fn table_transformer() -> Self {
        Self::from_names(["table", "table rotated"])
    }

    /// Read the `id2label` section of a model `config.json`
    pub fn from_model_config(config_json: &str) -> Result<Self, DetectionError> {
        #[derive(Deserialize)]
        struct ModelConfig {
            id2label: BTreeMap<usize, String>,
        }

        let config: ModelConfig = serde_json::from_str(config_json)
            .map_err(|e| DetectionError::ModelUnavailable(format!("invalid model config: {e}")))?;
        Ok(Self::new(config.id2label))
    }

    /// Label name for a class id
    #[must_use]
    pub fn name(&self, id: usize) -> Option<&str> {
        self.id2label.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.id2label.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id2label.is_empty()
    }
}

/// Page-level table detector
pub trait Detector {
    /// Vocabulary used to resolve [`Detection::label`]
    fn labels(&self) -> &LabelMap;

    /// Load or configure the model before the first page; no-op by default
    fn prepare(&mut self, options: &ModelOptions) -> Result<(), DetectionError> {
        let _ = options;
        Ok(())
    }

    /// Detect boxes on a full page, in the model's native score order
    fn detect(&mut self, image: &RgbImage) -> Result<Vec<Detection>, DetectionError>;
}

/// Errors that can occur around table detection
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Detection model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Invalid detection parameters: {0}")]
    InvalidParameters(String),

    #[error("Crop rectangle {x1},{y1},{x2},{y2} has no area")]
    EmptyCrop { x1: i64, y1: i64, x2: i64, y2: i64 },
}
