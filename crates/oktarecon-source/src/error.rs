//! Error types for source adapters.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `SourceError`.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors that can occur while reading a source export.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The export could not be read.
    #[error("failed to read source file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured column is not in the header row.
    #[error("source is missing required column(s): {}", .columns.join(", "))]
    MissingColumn { columns: Vec<String> },

    /// A row cannot be turned into a record.
    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    /// The format cannot be determined or is not supported.
    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// Configuration is inconsistent.
    #[error("invalid source configuration: {0}")]
    Config(String),
}
