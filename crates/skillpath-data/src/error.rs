//! Data loading error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading raw tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required data file does not exist.
    #[error("data file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A row could not be read or decoded.
    #[error("{path}:{line}: {message}")]
    Csv {
        path: String,
        line: u64,
        message: String,
    },

    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
