//! Collaborators that replay recorded model outputs
//!
//! Detections file:
//!
//! ```json
//! {
//!   "labels": ["table", "table rotated"],
//!   "detections": [{"score": 0.998, "label": 0, "bbox": [12.0, 40.5, 610.0, 388.0]}]
//! }
//! ```
//!
//! Transcripts file: a JSON array of strings, one per kept table, consumed
//! in order.

use crate::{Transcriber, TranscriptionError, TranscriptionRequest};
use image::RgbImage;
use serde::Deserialize;
use std::collections::VecDeque;
use table_extract_common::ModelOptions;
use table_extract_detection::{Detection, DetectionError, Detector, LabelMap};

#[derive(Deserialize)]
struct RecordedDetections {
    #[serde(default)]
    labels: Option<Vec<String>>,
    detections: Vec<Detection>,
}

/// Returns the same recorded detections for every page
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    labels: LabelMap,
    detections: Vec<Detection>,
    options: Option<ModelOptions>,
}

impl ReplayDetector {
    #[must_use]
    pub fn new(labels: LabelMap, detections: Vec<Detection>) -> Self {
        Self {
            labels,
            detections,
            options: None,
        }
    }

    /// Options received from [`Detector::prepare`]
    #[must_use]
    pub fn options(&self) -> Option<&ModelOptions> {
        self.options.as_ref()
    }

    /// Parse a detections file; the table-transformer labels are assumed
    /// when `labels` is missing
    pub fn from_json(json: &str) -> Result<Self, DetectionError> {
        let recorded: RecordedDetections = serde_json::from_str(json)
            .map_err(|e| DetectionError::ModelUnavailable(format!("invalid detections file: {e}")))?;
        let labels = recorded
            .labels
            .map_or_else(LabelMap::table_transformer, |names| LabelMap::from_names(names));
        Ok(Self::new(labels, recorded.detections))
    }
}

impl Detector for ReplayDetector {
    fn labels(&self) -> &LabelMap {
        &self.labels
    }

    fn prepare(&mut self, options: &ModelOptions) -> Result<(), DetectionError> {
        self.options = Some(options.clone());
        Ok(())
    }

    fn detect(&mut self, _image: &RgbImage) -> Result<Vec<Detection>, DetectionError> {
        Ok(self.detections.clone())
    }
}

/// Hands out recorded transcriptions one call at a time
#[derive(Debug, Clone, Default)]
pub struct ReplayTranscriber {
    transcripts: VecDeque<String>,
    consumed: usize,
    options: Option<ModelOptions>,
}

impl ReplayTranscriber {
    #[must_use]
    pub fn new(transcripts: impl IntoIterator<Item = String>) -> Self {
        Self {
            transcripts: transcripts.into_iter().collect(),
            consumed: 0,
            options: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TranscriptionError> {
        let transcripts: Vec<String> = serde_json::from_str(json).map_err(|e| {
            TranscriptionError::ModelUnavailable(format!("invalid transcripts file: {e}"))
        })?;
        Ok(Self::new(transcripts))
    }

    /// Transcriptions not yet handed out
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.transcripts.len()
    }

    /// Options received from [`Transcriber::prepare`]
    #[must_use]
    pub fn options(&self) -> Option<&ModelOptions> {
        self.options.as_ref()
    }
}

impl Transcriber for ReplayTranscriber {
    fn prepare(&mut self, options: &ModelOptions) -> Result<(), TranscriptionError> {
        self.options = Some(options.clone());
        Ok(())
    }

    fn transcribe(
        &mut self,
        _request: &TranscriptionRequest<'_>,
    ) -> Result<String, TranscriptionError> {
        let text = self
            .transcripts
            .pop_front()
            .ok_or(TranscriptionError::Exhausted {
                consumed: self.consumed,
            })?;
        self.consumed += 1;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use table_extract_detection::BoundingBox;

    #[test]
    fn test_replay_detector_parses_file() {
        let json = r#"{
            "labels": ["table", "table rotated"],
            "detections": [
                {"score": 0.99, "label": 0, "bbox": [1.0, 2.0, 30.0, 40.0]},
                {"score": 0.5, "label": 1, "bbox": [5, 5, 10, 10]}
            ]
        }"#;
        let mut detector = ReplayDetector::from_json(json).unwrap();
        assert_eq!(detector.labels().name(1), Some("table rotated"));

        let detections = detector.detect(&RgbImage::new(1, 1)).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].bbox, BoundingBox::new(1.0, 2.0, 30.0, 40.0));
        assert_eq!(detections[1].label, 1);
    }

    #[test]
    fn test_replay_detector_default_labels() {
        let detector = ReplayDetector::from_json(r#"{"detections": []}"#).unwrap();
        assert_eq!(detector.labels(), &LabelMap::table_transformer());
    }

    #[test]
    fn test_replay_detector_rejects_bad_box() {
        let json = r#"{"detections": [{"score": 0.9, "label": 0, "bbox": [1.0, 2.0]}]}"#;
        assert!(ReplayDetector::from_json(json).is_err());
    }

    #[test]
    fn test_replay_transcriber_in_order_then_exhausted() {
        let mut transcriber = ReplayTranscriber::from_json(r#"["first", "second"]"#).unwrap();
        let request = TranscriptionRequest::new(&[], 448, "p", 8);
        assert_eq!(transcriber.transcribe(&request).unwrap(), "first");
        assert_eq!(transcriber.remaining(), 1);
        assert_eq!(transcriber.transcribe(&request).unwrap(), "second");

        let err = transcriber.transcribe(&request).unwrap_err();
        assert!(matches!(err, TranscriptionError::Exhausted { consumed: 2 }));
    }

    #[test]
    fn test_replay_collaborators_keep_options() {
        let options = ModelOptions {
            cache: Some("/models".into()),
            load_in_8bit: true,
        };
        let mut detector = ReplayDetector::from_json(r#"{"detections": []}"#).unwrap();
        let mut transcriber = ReplayTranscriber::default();
        assert!(detector.options().is_none());
        assert!(transcriber.options().is_none());

        detector.prepare(&options).unwrap();
        transcriber.prepare(&options).unwrap();
        assert_eq!(detector.options(), Some(&options));
        assert_eq!(transcriber.options(), Some(&options));
    }
}
