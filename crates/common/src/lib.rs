/// Common types and utilities shared by the table extraction crates
pub mod logger;

pub use logger::{LogEntry, Logger, MemoryLogger, SharedLogger, TracingLogger};

use std::path::PathBuf;

/// Model loading options handed to detector and transcriber backends
/// before a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelOptions {
    /// Directory for downloaded model weights
    pub cache: Option<PathBuf>,
    /// Load transcription weights quantized to 8 bits
    pub load_in_8bit: bool,
}
