//! Output shaping and persistence
//!
//! Pipeline A stores each table as a list of records keyed by header:
//!
//! ```json
//! [{"Name": "bolt", "Qty": "4"}, {"Name": "nut", "Qty": "9"}]
//! ```
//!
//! Pipeline B stores the header and rows separately:
//!
//! ```json
//! {"columns": ["Name", "Qty"], "rows": [["bolt", "4"], ["nut", "9"]]}
//! ```

use crate::{PipelineError, Variant};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use table_extract_parser::ParsedTable;

/// Contents of one `output_<variant>_<timestamp>.json` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionArtifact {
    /// File stem of the source image
    pub image: String,
    pub variant: Variant,
    /// Unix timestamp (seconds) of the run
    pub timestamp: i64,
    pub tables: Vec<Value>,
}

impl ExtractionArtifact {
    #[must_use]
    pub fn new(
        image: impl Into<String>,
        variant: Variant,
        timestamp: i64,
        tables: &[ParsedTable],
    ) -> Self {
        Self {
            image: image.into(),
            variant,
            timestamp,
            tables: tables.iter().map(|t| shape_table(variant, t)).collect(),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("output_{}_{}.json", self.variant.name(), self.timestamp)
    }

    /// Write the artifact into `dir`, creating it if needed
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, PipelineError> {
        std::fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(self.file_name());
        let io_err = |source| PipelineError::Io {
            path: path.clone(),
            source,
        };
        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(io_err)?;
        Ok(path)
    }
}

/// JSON form of a table for the given variant
#[must_use]
pub fn shape_table(variant: Variant, table: &ParsedTable) -> Value {
    match variant {
        Variant::PipelineA => Value::Array(records(table)),
        Variant::PipelineB => json!({
            "columns": table.header,
            "rows": table.rows,
        }),
    }
}

fn records(table: &ParsedTable) -> Vec<Value> {
    let keys = record_keys(table);
    table
        .rows
        .iter()
        .map(|row| {
            let record: Map<String, Value> = keys
                .iter()
                .zip(row)
                .map(|(key, cell)| (key.clone(), Value::String(cell.clone())))
                .collect();
            Value::Object(record)
        })
        .collect()
}

/// Header names made unique; positional keys when there is no header.
///
/// Blank names become `Unnamed: <i>` and repeats get a `.1`, `.2` ... suffix
/// so no cell is lost to a key collision.
fn record_keys(table: &ParsedTable) -> Vec<String> {
    let Some(header) = &table.header else {
        return (0..table.column_count()).map(|i| i.to_string()).collect();
    };

    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name.clone()
            };
            let mut key = base.clone();
            while let Some(count) = seen.get_mut(&key) {
                *count += 1;
                key = format!("{base}.{count}");
            }
            seen.insert(key.clone(), 0);
            key
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn parts_table() -> ParsedTable {
        ParsedTable {
            header: Some(cells(&["Name", "Qty"])),
            rows: vec![cells(&["bolt", "4"]), cells(&["nut", "9"])],
        }
    }

    #[test]
    fn test_pipeline_a_records() {
        let shaped = shape_table(Variant::PipelineA, &parts_table());
        assert_eq!(
            shaped,
            json!([{"Name": "bolt", "Qty": "4"}, {"Name": "nut", "Qty": "9"}])
        );
    }

    #[test]
    fn test_pipeline_a_record_key_order() {
        let table = ParsedTable {
            header: Some(cells(&["z", "a"])),
            rows: vec![cells(&["1", "2"])],
        };
        let shaped = shape_table(Variant::PipelineA, &table);
        assert_eq!(shaped.to_string(), r#"[{"z":"1","a":"2"}]"#);
    }

    #[test]
    fn test_pipeline_a_headerless_positional_keys() {
        let table = ParsedTable {
            header: None,
            rows: vec![cells(&["x", "y"])],
        };
        let shaped = shape_table(Variant::PipelineA, &table);
        assert_eq!(shaped, json!([{"0": "x", "1": "y"}]));
    }

    #[test]
    fn test_pipeline_a_duplicate_and_blank_headers() {
        let table = ParsedTable {
            header: Some(cells(&["Qty", "", "Qty", "Qty"])),
            rows: vec![cells(&["1", "2", "3", "4"])],
        };
        let shaped = shape_table(Variant::PipelineA, &table);
        assert_eq!(
            shaped,
            json!([{"Qty": "1", "Unnamed: 1": "2", "Qty.1": "3", "Qty.2": "4"}])
        );
    }

    #[test]
    fn test_pipeline_b_shape() {
        let shaped = shape_table(Variant::PipelineB, &parts_table());
        assert_eq!(
            shaped,
            json!({"columns": ["Name", "Qty"], "rows": [["bolt", "4"], ["nut", "9"]]})
        );

        let headerless = ParsedTable {
            header: None,
            rows: vec![cells(&["x"])],
        };
        assert_eq!(
            shape_table(Variant::PipelineB, &headerless),
            json!({"columns": null, "rows": [["x"]]})
        );
    }

    #[test]
    fn test_artifact_file_name() {
        let artifact = ExtractionArtifact::new("page", Variant::PipelineB, 1_700_000_000, &[]);
        assert_eq!(artifact.file_name(), "output_pipeline_b_1700000000.json");
    }

    #[test]
    fn test_artifact_written_and_readable() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let artifact =
            ExtractionArtifact::new("page", Variant::PipelineA, 42, &[parts_table()]);

        let path = artifact.write_to(&out).unwrap();
        assert_eq!(path, out.join("output_pipeline_a_42.json"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let back: ExtractionArtifact = serde_json::from_str(&contents).unwrap();
        assert_eq!(back, artifact);
    }
}
