//! Error types for the command-line tool.

use std::path::PathBuf;

/// Errors that can occur while writing results.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Writing the output file failed.
    #[error("Failed to write output to '{path}': {source}")]
    Write {
        /// The output file.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Encoding the statements as JSON failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
