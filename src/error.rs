//! Error taxonomy for the sort core and its loader.
//!
//! Cancellation is not an error: a stopped run is a terminal state, reported as
//! [`SortEvent::RunCancelled`](crate::model::SortEvent::RunCancelled), not a failure.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SortError {
    /// Rejected synchronously before any work starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A malformed source record. No partial dataset is produced.
    #[error("malformed record on line {line}: {reason}")]
    Load { line: usize, reason: String },

    #[error("failed to spawn sort worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SortError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SortError::InvalidInput(msg.into())
    }

    pub(crate) fn load(line: usize, reason: impl Into<String>) -> Self {
        SortError::Load {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SortError>;
