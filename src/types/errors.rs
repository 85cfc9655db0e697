//! Error types used across turntable.
use std::path::PathBuf;

use thiserror::Error;

/// Step-local failure taxonomy. Every variant aborts the current step and
/// triggers rollback of all previously completed steps in the run.
#[derive(Debug, Error)]
pub enum StepError {
    /// An expected source path is missing.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// A destination exists in an unexpected state.
    #[error("conflict at {path}: {msg}")]
    Conflict { path: PathBuf, msg: String },

    /// Delimited-block structure violated in a line-oriented file.
    #[error("malformed block in {path}: {msg}")]
    MalformedBlock { path: PathBuf, msg: String },

    /// Ownership or mode change denied.
    #[error("permission denied on {path}: {source}")]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Programming error: restore without a prior snapshot, a double
    /// snapshot of the same path, or a corrupted scratch entry. Fatal;
    /// not recoverable within the run.
    #[error("internal consistency: {0}")]
    InternalConsistency(String),
}

/// Convenient alias for results returning a [`StepError`].
pub type Result<T> = std::result::Result<T, StepError>;
