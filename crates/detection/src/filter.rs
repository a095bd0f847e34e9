//! Selection of table detections

use crate::{BoundingBox, Detection, DetectionError, LabelMap};
use table_extract_common::SharedLogger;

/// Label name the table-transformer model uses for tables
pub const DEFAULT_TABLE_LABEL: &str = "table";

/// A kept detection with its padded crop rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRegion {
    /// Position among the kept regions (0-based)
    pub index: usize,
    pub score: f32,
    /// Box as reported by the detector
    pub bbox: BoundingBox,
    /// Box grown by the padding; may extend past the page
    pub padded: BoundingBox,
}

/// Keeps detections of one label above a confidence threshold.
///
/// Detector order is preserved and no overlap suppression is applied; the
/// detector is expected to have done that already.
pub struct DetectionFilter {
    table_label: String,
    threshold: f32,
    padding: u32,
    logger: SharedLogger,
}

impl DetectionFilter {
    pub fn new(
        table_label: impl Into<String>,
        threshold: f32,
        padding: u32,
        logger: SharedLogger,
    ) -> Result<Self, DetectionError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DetectionError::InvalidParameters(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self {
            table_label: table_label.into(),
            threshold,
            padding,
            logger,
        })
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[must_use]
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Detections labelled as tables with `score >= threshold`, padded
    #[must_use]
    pub fn select(&self, detections: &[Detection], labels: &LabelMap) -> Vec<TableRegion> {
        let padding = self.padding as f32;
        let regions: Vec<TableRegion> = detections
            .iter()
            .filter(|d| labels.name(d.label) == Some(self.table_label.as_str()))
            .filter(|d| d.score >= self.threshold)
            .enumerate()
            .map(|(index, d)| TableRegion {
                index,
                score: d.score,
                bbox: d.bbox,
                padded: d.bbox.expand(padding),
            })
            .collect();

        self.logger.debug(&format!(
            "Kept {} of {} detections labelled '{}' with score >= {}",
            regions.len(),
            detections.len(),
            self.table_label,
            self.threshold
        ));
        regions
    }
}
