//! Error types for the Turnstile library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Turnstile operations.
#[derive(Debug, Error)]
pub enum TurnstileError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Batch contains no records to work with.
    #[error("Empty batch: {0}")]
    EmptyBatch(String),

    /// Cannot derive a usable schema for the batch.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Bulk load transaction failed; the whole batch was rolled back.
    #[error("Load error for table '{table}': {source}")]
    Load {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Error from the store outside a bulk load.
    #[error("Store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Turnstile operations.
pub type Result<T> = std::result::Result<T, TurnstileError>;
