//! Core error types.
//!
//! Most derivation steps cannot fail: incomplete joins and empty results are
//! legitimate states. These are the few conditions callers must handle.

use thiserror::Error;

/// Errors raised by the similarity index and engine configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The student has no row in the similarity matrix (no performance data).
    #[error("student not found in similarity index: {0}")]
    StudentNotFound(String),

    /// An engine configuration value is out of range.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    /// Returns `true` if this error means "no data for this student yet".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::StudentNotFound(_))
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
