//! Error types for file operations.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use terminus_core::CopyError;
use thiserror::Error;

/// Which half of a cross-device move failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackStage {
    /// Copying the tree to the destination. The source is untouched.
    Copy,
    /// Removing the source after a complete copy. The destination is
    /// complete; the source may be partially removed.
    RemoveSource,
}

impl std::fmt::Display for FallbackStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "copying to the destination"),
            Self::RemoveSource => write!(f, "removing the source"),
        }
    }
}

/// Underlying reason a delete failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteReason {
    PermissionDenied,
    NotFound,
    Busy,
    Other,
}

impl DeleteReason {
    /// Classify an I/O error.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::ResourceBusy => Self::Busy,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::NotFound => write!(f, "not found"),
            Self::Busy => write!(f, "resource busy"),
            Self::Other => write!(f, "failed"),
        }
    }
}

/// Errors returned by single-item operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Destination is occupied and overwrite was not requested.
    #[error("Destination exists: {path}")]
    DestinationExists { path: PathBuf },

    /// The copy-then-delete fallback of a cross-device move failed partway.
    #[error("Cross-device move to {destination} failed while {stage}: {cause}")]
    CrossDeviceFallbackFailed {
        path: PathBuf,
        destination: PathBuf,
        stage: FallbackStage,
        #[source]
        cause: io::Error,
    },

    /// Copying an entry of the tree failed. `path` and `destination` name
    /// the entry that failed, not necessarily the item's root.
    #[error("Failed to copy {path} to {destination}: {cause}")]
    CopyFailed {
        path: PathBuf,
        destination: PathBuf,
        #[source]
        cause: io::Error,
    },

    /// Removing a file or directory failed.
    #[error("Failed to delete {path}: {reason}")]
    DeleteError {
        path: PathBuf,
        reason: DeleteReason,
        #[source]
        cause: io::Error,
    },

    /// Rename target already exists. Rename never overwrites.
    #[error("A file or folder named '{name}' already exists")]
    NameCollision { path: PathBuf, name: String },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// The requested name is not a valid filename.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A directory cannot be copied or moved into its own subtree.
    #[error("Cannot copy or move {path} into itself")]
    SourceIsAncestor { path: PathBuf, destination: PathBuf },

    /// Source path does not exist.
    #[error("Source not found: {path}")]
    SourceMissing { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {cause}")]
    Io {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },

    /// The blocking task running the operation panicked or was cancelled.
    #[error("Task failed: {message}")]
    Task { message: String },
}

impl OpsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, cause: io::Error) -> Self {
        let path = path.into();
        match cause.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, cause },
        }
    }

    /// Create a copy error from the step that failed.
    pub fn copy(err: CopyError) -> Self {
        Self::CopyFailed {
            path: err.from,
            destination: err.to,
            cause: err.cause,
        }
    }

    /// Create a delete error, classifying the cause.
    pub fn delete(path: impl Into<PathBuf>, cause: io::Error) -> Self {
        Self::DeleteError {
            path: path.into(),
            reason: DeleteReason::from_io(&cause),
            cause,
        }
    }

    /// Whether resubmitting with different options can succeed
    /// (a collision the caller may resolve with overwrite or a new name).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DestinationExists { .. } | Self::NameCollision { .. }
        )
    }

    /// Whether this failure left partially-applied state on disk.
    pub fn left_partial_state(&self) -> bool {
        matches!(self, Self::CrossDeviceFallbackFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_maps_permission_denied() {
        let err = OpsError::io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, OpsError::PermissionDenied { .. }));

        let err = OpsError::io("/x", io::Error::from(io::ErrorKind::Other));
        assert!(matches!(err, OpsError::Io { .. }));
    }

    #[test]
    fn test_delete_reason() {
        let err = OpsError::delete("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(
            err,
            OpsError::DeleteError {
                reason: DeleteReason::NotFound,
                ..
            }
        ));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_recoverable_and_partial() {
        assert!(OpsError::DestinationExists { path: "/x".into() }.is_recoverable());
        let partial = OpsError::CrossDeviceFallbackFailed {
            path: "/a".into(),
            destination: "/b".into(),
            stage: FallbackStage::RemoveSource,
            cause: io::Error::from(io::ErrorKind::Other),
        };
        assert!(partial.left_partial_state());
        assert!(!partial.is_recoverable());
    }
}
