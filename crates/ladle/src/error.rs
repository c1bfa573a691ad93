//! Error types for the ladle library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ladle operations.
///
/// Row-level problems (unparseable quantities, unmatched ingredients, missing
/// densities) are *data*, carried on the output record as warning and failure
/// codes. This enum covers the process-level failures that abort a run:
/// unreadable files, malformed reference tables, bad configuration.
#[derive(Debug, Error)]
pub enum LadleError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV reader while loading reference tables.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reference snapshot is structurally invalid (missing table, bad row).
    #[error("Reference data error: {0}")]
    Reference(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LadleError {
    /// Convenience constructor for IO errors tagged with their path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LadleError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for ladle operations.
pub type Result<T> = std::result::Result<T, LadleError>;
