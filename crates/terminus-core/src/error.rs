//! Error types for listing operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while listing a directory.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Path is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The background task running the listing failed.
    #[error("{message}")]
    Other { message: String },
}

impl ListingError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::NotADirectory => Self::NotADirectory { path },
            _ => Self::Io { path, source },
        }
    }
}

/// A recursive copy stopped at one step.
///
/// `from` and `to` name the entry being copied when it failed, which may
/// be deep inside the tree the caller asked for.
#[derive(Debug, Error)]
#[error("Failed to copy {from} to {to}: {cause}")]
pub struct CopyError {
    pub from: PathBuf,
    pub to: PathBuf,
    #[source]
    pub cause: io::Error,
}

impl CopyError {
    pub fn new(from: &Path, to: &Path, cause: io::Error) -> Self {
        Self {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            cause,
        }
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.cause.kind()
    }
}
