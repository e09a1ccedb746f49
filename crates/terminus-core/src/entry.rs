//! Filesystem entry types.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::fs::Stat;

/// Entry timestamps. Both are optional because stat can fail and not every
/// platform reports a creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Last modification time.
    pub modified: Option<SystemTime>,
    /// Creation time (if available, platform-dependent).
    pub created: Option<SystemTime>,
}

impl Timestamps {
    /// Create timestamps with only modified time.
    pub fn with_modified(modified: SystemTime) -> Self {
        Self {
            modified: Some(modified),
            created: None,
        }
    }

    /// Create timestamps with all available times.
    pub fn new(modified: Option<SystemTime>, created: Option<SystemTime>) -> Self {
        Self { modified, created }
    }
}

/// Marker for an entry whose metadata could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryError {
    /// Stat was refused by the filesystem.
    PermissionDenied,
    /// Stat failed for another reason (vanished, broken link, I/O).
    Stat,
}

impl std::fmt::Display for EntryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "Permission denied"),
            Self::Stat => write!(f, "Metadata unavailable"),
        }
    }
}

/// A single file or directory as observed by a listing.
///
/// An entry whose stat failed is still an entry: it keeps its name, path and
/// best-effort type flags, and carries `error`. Listings never drop it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// File/directory name (not full path).
    pub name: CompactString,
    /// Absolute path with platform-native separators.
    pub path: PathBuf,
    /// Whether this is a directory. Mutually exclusive with `is_file`
    /// unless `error` is set, in which case both may be false.
    pub is_directory: bool,
    /// Whether this is a regular file.
    pub is_file: bool,
    /// Size in bytes.
    pub size: u64,
    /// Modification/creation times.
    pub timestamps: Timestamps,
    /// Raw permission/mode bits, opaque to the engine.
    pub permissions: Option<u32>,
    /// Set when the entry's metadata could not be read.
    pub error: Option<EntryError>,
}

impl Entry {
    /// Build an entry from a successful stat.
    pub fn from_stat(path: impl Into<PathBuf>, stat: &Stat) -> Self {
        let path = path.into();
        Self {
            name: entry_name(&path),
            is_directory: stat.is_dir,
            is_file: stat.is_file,
            size: stat.size,
            timestamps: Timestamps::new(stat.modified, stat.created),
            permissions: stat.mode,
            error: None,
            path,
        }
    }

    /// Build an entry whose stat failed, keeping the type flags reported by
    /// the directory read.
    pub fn unreadable(
        path: impl Into<PathBuf>,
        is_directory: bool,
        is_file: bool,
        error: EntryError,
    ) -> Self {
        let path = path.into();
        Self {
            name: entry_name(&path),
            is_directory,
            is_file,
            size: 0,
            timestamps: Timestamps::default(),
            permissions: None,
            error: Some(error),
            path,
        }
    }

    /// Check whether the entry's metadata failed to load.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the name starts with a dot.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Case-insensitive substring match against the entry name.
    pub fn matches(&self, query: &str) -> bool {
        name_matches(&self.name, query)
    }
}

/// Case-insensitive substring match used by both FILTER and SEARCH.
///
/// An empty query matches everything.
pub fn name_matches(name: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&query.to_lowercase())
}

fn entry_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::from(name.to_string_lossy()),
        None => CompactString::from(path.to_string_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches_is_case_insensitive() {
        assert!(name_matches("Report.TXT", "rep"));
        assert!(name_matches("report.txt", "PORT"));
        assert!(!name_matches("readme.md", "rep"));
        assert!(name_matches("anything", ""));
    }

    #[test]
    fn test_unreadable_entry_keeps_identity() {
        let entry = Entry::unreadable("/root/secret", true, false, EntryError::PermissionDenied);
        assert_eq!(entry.name, "secret");
        assert!(entry.is_directory);
        assert!(entry.has_error());
        assert_eq!(entry.size, 0);
    }
}
