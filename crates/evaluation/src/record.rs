//! Evaluation input records

use crate::EvaluationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Ground truth and both pipelines' predictions for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Image identifier (the key in the results file)
    #[serde(skip)]
    pub id: String,
    pub actual: String,
    pub pred_pipeline_a: String,
    pub pred_pipeline_b: String,
    /// Seconds taken by pipeline A
    pub time_pipeline_a: f64,
    /// Seconds taken by pipeline B
    pub time_pipeline_b: f64,
    /// Document kind used to group averages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

/// Parse a results document: a JSON object keyed by image identifier.
///
/// Records keep the order of the document.
pub fn parse_records(json: &str) -> Result<Vec<EvaluationRecord>, EvaluationError> {
    let entries: Map<String, Value> = serde_json::from_str(json)?;
    entries
        .into_iter()
        .map(|(id, value)| {
            let mut record: EvaluationRecord =
                serde_json::from_value(value).map_err(|e| EvaluationError::InvalidRecord {
                    id: id.clone(),
                    reason: e.to_string(),
                })?;
            record.id = id;
            Ok(record)
        })
        .collect()
}

/// Read and parse a results file
pub fn load_records(path: &Path) -> Result<Vec<EvaluationRecord>, EvaluationError> {
    let contents = std::fs::read_to_string(path).map_err(|source| EvaluationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"{
        "receipt_03.png": {
            "actual": "| item | price |",
            "pred_pipeline_a": "| item | price |",
            "pred_pipeline_b": "| item |",
            "time_pipeline_a": 12.5,
            "time_pipeline_b": 8,
            "archetype": "receipt"
        },
        "annual_report_01.png": {
            "actual": "a",
            "pred_pipeline_a": "b",
            "pred_pipeline_b": "c",
            "time_pipeline_a": 1.0,
            "time_pipeline_b": 2.0
        }
    }"#;

    #[test]
    fn test_document_order_preserved() {
        let records = parse_records(RESULTS).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["receipt_03.png", "annual_report_01.png"]);
    }

    #[test]
    fn test_fields_and_optional_archetype() {
        let records = parse_records(RESULTS).unwrap();
        assert_eq!(records[0].time_pipeline_b, 8.0);
        assert_eq!(records[0].archetype.as_deref(), Some("receipt"));
        assert_eq!(records[1].archetype, None);
    }

    #[test]
    fn test_missing_field_names_record() {
        let json = r#"{"img1": {"actual": "x", "pred_pipeline_a": "y"}}"#;
        let err = parse_records(json).unwrap_err();
        match err {
            EvaluationError::InvalidRecord { id, .. } => assert_eq!(id, "img1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            parse_records("[1, 2]"),
            Err(EvaluationError::Parse(_))
        ));
    }

    #[test]
    fn test_load_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, RESULTS).unwrap();
        assert_eq!(load_records(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_records(Path::new("/nonexistent/results.json")).unwrap_err();
        assert!(matches!(err, EvaluationError::Read { .. }));
    }
}
