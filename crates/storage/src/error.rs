//! Storage error types.

use std::path::PathBuf;

use crate::BackendKind;

/// Result alias for backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by a key-value backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The store could not be opened: bad path, unsupported layout, or a lock
    /// held by another process.
    #[error("failed to open {kind} datastore at {}: {reason}", path.display())]
    Open {
        kind: BackendKind,
        path: PathBuf,
        reason: String,
    },
    /// A scan or point read failed after the store was opened.
    #[error("{kind} read failed: {reason}")]
    Read { kind: BackendKind, reason: String },
}

impl StorageError {
    /// Build an [`StorageError::Open`] from any displayable engine error.
    pub fn open(kind: BackendKind, path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Open {
            kind,
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Build an [`StorageError::Read`] from any displayable engine error.
    pub fn read(kind: BackendKind, err: impl std::fmt::Display) -> Self {
        Self::Read {
            kind,
            reason: err.to_string(),
        }
    }
}
