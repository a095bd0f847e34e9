//! Injected logging capability
//!
//! Components take a [`SharedLogger`] in their constructors instead of
//! reaching for a process-wide logger. Binaries pass a [`TracingLogger`],
//! which forwards to the `tracing` macros; tests pass a [`MemoryLogger`] and
//! assert on what was recorded.

use std::sync::{Arc, Mutex};
use tracing::Level;

/// Leveled logging sink
pub trait Logger: Send + Sync {
    /// Record one message at the given level
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

/// Logger handle shared between pipeline components
pub type SharedLogger = Arc<dyn Logger>;

/// Forwards every message to the installed `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    #[must_use]
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{message}"),
            Level::WARN => tracing::warn!("{message}"),
            Level::INFO => tracing::info!("{message}"),
            Level::DEBUG => tracing::debug!("{message}"),
            _ => tracing::trace!("{message}"),
        }
    }
}

/// One recorded log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages logged at exactly `level`
    #[must_use]
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message)
            .collect()
    }

    /// Whether any message contains `needle`
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|entry| entry.message.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, message: &str) {
        // A poisoned lock only means another test thread panicked mid-push
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                message: message.to_string(),
            });
        }
    }
}
