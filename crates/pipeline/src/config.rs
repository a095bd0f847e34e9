//! Pipeline configuration
//!
//! Loaded from a JSON file and validated once before the pipeline starts.
//! Only `image_path` and `output_path` are required:
//!
//! ```json
//! {
//!   "image_path": "./data/page.png",
//!   "output_path": "./output",
//!   "cache": "./cache",
//!   "padding": 10,
//!   "threshold": 0.9,
//!   "save_temp_files": true,
//!   "max_new_tokens": 1024,
//!   "use_pipeline_a": true,
//!   "log_file_path": "./logs/pipeline.log"
//! }
//! ```

use crate::Variant;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use table_extract_common::ModelOptions;
use table_extract_tiling::TilingConfig;
use thiserror::Error;

/// Default minimum detection confidence
pub const DEFAULT_THRESHOLD: f32 = 0.9;
/// Default generation budget per table
pub const DEFAULT_MAX_NEW_TOKENS: usize = 1024;

/// Errors raised while loading or validating a [`PipelineConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings for one extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Page image to extract tables from
    #[serde(alias = "input_path")]
    pub image_path: PathBuf,
    /// Directory receiving the JSON artifact (and `temp/` files)
    pub output_path: PathBuf,
    /// Model cache directory, handed to both models via [`ModelOptions`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<PathBuf>,
    /// Pixels added on every side of a detected box before cropping
    #[serde(default)]
    pub padding: u32,
    /// Minimum detection score, inclusive
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Write every crop and its box to `<output_path>/temp`
    #[serde(default)]
    pub save_temp_files: bool,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: usize,
    /// 8-bit transcription weights, handed over via [`ModelOptions`]
    #[serde(default)]
    pub load_in_8bit: bool,
    /// Pipeline A when true, pipeline B otherwise
    #[serde(default = "default_use_pipeline_a")]
    pub use_pipeline_a: bool,
    /// Append logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<PathBuf>,
    #[serde(default)]
    pub tiling: TilingConfig,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_max_new_tokens() -> usize {
    DEFAULT_MAX_NEW_TOKENS
}

fn default_use_pipeline_a() -> bool {
    true
}

impl PipelineConfig {
    /// Config with every optional setting at its default
    #[must_use]
    pub fn new(image_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            output_path: output_path.into(),
            cache: None,
            padding: 0,
            threshold: DEFAULT_THRESHOLD,
            save_temp_files: false,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            load_in_8bit: false,
            use_pipeline_a: true,
            log_file_path: None,
            tiling: TilingConfig::default(),
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_path.as_os_str().is_empty() {
            return Err(invalid("image_path", "must not be empty"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(invalid("output_path", "must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(invalid(
                "threshold",
                format!("must be within [0, 1], got {}", self.threshold),
            ));
        }
        if self.max_new_tokens == 0 {
            return Err(invalid("max_new_tokens", "must be greater than 0"));
        }
        self.tiling
            .validate()
            .map_err(|e| invalid("tiling", e.to_string()))?;
        Ok(())
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        Variant::from_flag(self.use_pipeline_a)
    }

    /// Options the detector and transcriber are prepared with
    #[must_use]
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            cache: self.cache.clone(),
            load_in_8bit: self.load_in_8bit,
        }
    }

    /// `key: value` pairs in declaration order, for the startup log
    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let optional = |path: &Option<PathBuf>| {
            path.as_ref()
                .map_or_else(|| "None".to_string(), |p| p.display().to_string())
        };
        vec![
            ("image_path", self.image_path.display().to_string()),
            ("output_path", self.output_path.display().to_string()),
            ("cache", optional(&self.cache)),
            ("padding", self.padding.to_string()),
            ("threshold", self.threshold.to_string()),
            ("save_temp_files", self.save_temp_files.to_string()),
            ("max_new_tokens", self.max_new_tokens.to_string()),
            ("load_in_8bit", self.load_in_8bit.to_string()),
            ("use_pipeline_a", self.use_pipeline_a.to_string()),
            ("log_file_path", optional(&self.log_file_path)),
            (
                "tiling",
                format!(
                    "{}px, {}-{} blocks",
                    self.tiling.image_size, self.tiling.min_blocks, self.tiling.max_blocks
                ),
            ),
        ]
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_applied() {
        let config = PipelineConfig::from_json_str(
            r#"{"image_path": "page.png", "output_path": "out"}"#,
        )
        .unwrap();
        assert_eq!(config, PipelineConfig::new("page.png", "out"));
        assert_eq!(config.padding, 0);
        assert_eq!(config.threshold, 0.9);
        assert_eq!(config.max_new_tokens, 1024);
        assert!(config.use_pipeline_a);
        assert!(!config.save_temp_files);
        assert_eq!(config.variant(), Variant::PipelineA);
    }

    #[test]
    fn test_input_path_alias() {
        let config = PipelineConfig::from_json_str(
            r#"{"input_path": "scan.jpg", "output_path": "out", "use_pipeline_a": false}"#,
        )
        .unwrap();
        assert_eq!(config.image_path, PathBuf::from("scan.jpg"));
        assert_eq!(config.variant(), Variant::PipelineB);
    }

    #[test]
    fn test_missing_required_field() {
        let err = PipelineConfig::from_json_str(r#"{"image_path": "page.png"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = PipelineConfig::from_json_str(
            r#"{"image_path": "p.png", "output_path": "o", "threshold": 1.2}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "threshold",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_tokens_rejected() {
        let mut config = PipelineConfig::new("p.png", "o");
        config.max_new_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_padding_rejected_by_parser() {
        let err = PipelineConfig::from_json_str(
            r#"{"image_path": "p.png", "output_path": "o", "padding": -5}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_tiling_rejected() {
        let err = PipelineConfig::from_json_str(
            r#"{"image_path": "p.png", "output_path": "o",
                "tiling": {"image_size": 448, "min_blocks": 6, "max_blocks": 2}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tiling", .. }));
    }

    #[test]
    fn test_model_options_from_config() {
        let config = PipelineConfig::from_json_str(
            r#"{"image_path": "p.png", "output_path": "o",
                "cache": "/models", "load_in_8bit": true}"#,
        )
        .unwrap();
        assert_eq!(
            config.model_options(),
            ModelOptions {
                cache: Some(PathBuf::from("/models")),
                load_in_8bit: true,
            }
        );
        assert_eq!(
            PipelineConfig::new("p.png", "o").model_options(),
            ModelOptions::default()
        );
    }

    #[test]
    fn test_oversized_tiling_rejected() {
        let err = PipelineConfig::from_json_str(
            r#"{"image_path": "p.png", "output_path": "o",
                "tiling": {"image_size": 448, "min_blocks": 1, "max_blocks": 70000}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tiling", .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"image_path": "page.png", "output_path": "out", "padding": 12, "save_temp_files": true}}"#
        )
        .unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.padding, 12);
        assert!(config.save_temp_files);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_summary_in_field_order() {
        let summary = PipelineConfig::new("page.png", "out").summary();
        assert_eq!(summary[0], ("image_path", "page.png".to_string()));
        assert_eq!(summary[1], ("output_path", "out".to_string()));
        assert!(summary.iter().any(|(k, v)| *k == "threshold" && v == "0.9"));
        assert!(summary.iter().any(|(k, v)| *k == "cache" && v == "None"));
    }
}
