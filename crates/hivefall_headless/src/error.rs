//! Error types for the headless runner.

use std::path::PathBuf;

use hivefall_core::error::HivefallError;
use thiserror::Error;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Errors surfaced by the runner.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Engine-side failure (rules, replays, invariants).
    #[error(transparent)]
    Core(#[from] HivefallError),

    /// Rules file could not be read.
    #[error("Failed to read rules file '{}': {source}", path.display())]
    RulesFile {
        /// File that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
