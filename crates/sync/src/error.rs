//! Sync error types.

use std::path::PathBuf;

use caravan_shared::AppError;
use thiserror::Error;

/// Persistence and sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading or writing the snapshot file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The snapshot file exists but does not parse.
    #[error("snapshot {} is not valid: {source}", .path.display())]
    Decode {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The snapshot could not be serialized.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        AppError::Storage(err.to_string())
    }
}
