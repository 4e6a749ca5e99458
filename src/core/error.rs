//! Error taxonomy for save collections.
//!
//! Fatal conditions are `SaveError` variants carried inside `anyhow::Error`
//! so callers can downcast when the kind matters (optional pre-reads).
//! Non-fatal body write results are plain outcomes, not errors.

use std::path::PathBuf;

/// Domain errors that callers may need to tell apart
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Malformed, non-increasing, or trailing-after-open-tail selector
    #[error("invalid id in '{input}': {reason}")]
    InvalidId { input: String, reason: String },

    /// Required index or archive file is missing
    #[error("no save data found at {}", .0.display())]
    NotFound(PathBuf),

    /// Destination selector ran out of ids while sources still had records
    #[error("too many source savefiles for {dest}")]
    Exhausted { dest: String },
}

impl SaveError {
    pub(crate) fn invalid_id(input: &str, reason: impl Into<String>) -> Self {
        SaveError::InvalidId {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result of writing one record body into a native save directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyWrite {
    /// New content hit the disk
    Written,
    /// File already held identical bytes; nothing written
    NotChanged,
    /// Record carries no body; metadata-only
    NoData,
}

/// True when `err` carries `SaveError::NotFound`
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<SaveError>(), Some(SaveError::NotFound(_)))
}
