//! Error types for splitting scripts.

use crate::splitter::SyntaxErrorReport;

/// Errors returned by the [`Splitter`](crate::Splitter).
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// The script could not be read.
    #[error("error reading input: {0}")]
    Io(#[from] std::io::Error),

    /// The script has at least one syntax error.
    #[error("{0}")]
    Syntax(#[from] SyntaxErrorReport),
}

impl SplitError {
    /// Returns the syntax error report, if this is a syntax error.
    #[must_use]
    pub const fn as_syntax(&self) -> Option<&SyntaxErrorReport> {
        match self {
            Self::Syntax(report) => Some(report),
            Self::Io(_) => None,
        }
    }
}

/// Result type for splitting operations.
pub type Result<T> = std::result::Result<T, SplitError>;
