//! File operation types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::OpsError;

/// The type of operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Copy,
    Move,
    Delete,
    Rename,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "Copy"),
            Self::Move => write!(f, "Move"),
            Self::Delete => write!(f, "Delete"),
            Self::Rename => write!(f, "Rename"),
        }
    }
}

/// One queued transfer. Consumed exactly once by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationItem {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub overwrite: bool,
}

impl OperationItem {
    /// Create a transfer that fails if the destination exists.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            overwrite: false,
        }
    }

    /// Set the overwrite flag.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// A path to delete, with the caller's view of its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTarget {
    pub path: PathBuf,
    pub is_directory: bool,
}

impl DeleteTarget {
    pub fn new(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            is_directory,
        }
    }
}

/// Outcome of one batch item.
#[derive(Debug)]
pub struct ItemResult {
    pub source: PathBuf,
    /// Empty for deletions.
    pub destination: PathBuf,
    pub error: Option<OpsError>,
}

impl ItemResult {
    pub fn new(source: PathBuf, destination: PathBuf, error: Option<OpsError>) -> Self {
        Self {
            source,
            destination,
            error,
        }
    }

    /// Whether the item succeeded.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Ordered per-item results of a batch, in submission order.
#[derive(Debug)]
pub struct BatchResult {
    /// The operation the batch ran.
    pub operation: OperationType,
    /// One entry per submitted item.
    pub per_item: Vec<ItemResult>,
}

impl BatchResult {
    /// Create an empty result.
    pub fn new(operation: OperationType) -> Self {
        Self {
            operation,
            per_item: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, item: ItemResult) {
        self.per_item.push(item);
    }

    /// A batch whose task died before finishing: every item fails with
    /// [`OpsError::Task`], keeping the result aligned with the input.
    pub(crate) fn abandoned(
        operation: OperationType,
        items: impl IntoIterator<Item = (PathBuf, PathBuf)>,
        message: &str,
    ) -> Self {
        let mut result = Self::new(operation);
        for (source, destination) in items {
            result.push(ItemResult::new(
                source,
                destination,
                Some(OpsError::Task {
                    message: message.to_string(),
                }),
            ));
        }
        result
    }

    /// Logical AND of every item's outcome (true for an empty batch).
    pub fn all_succeeded(&self) -> bool {
        self.per_item.iter().all(ItemResult::success)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.per_item.len()
    }

    /// Check if the batch had no items.
    pub fn is_empty(&self) -> bool {
        self.per_item.is_empty()
    }

    /// Number of failed items.
    pub fn failed_count(&self) -> usize {
        self.per_item.iter().filter(|r| !r.success()).count()
    }

    /// Sources of the items that succeeded.
    pub fn succeeded_sources(&self) -> impl Iterator<Item = &Path> {
        self.per_item
            .iter()
            .filter(|r| r.success())
            .map(|r| r.source.as_path())
    }

    /// Failed items with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &OpsError)> {
        self.per_item
            .iter()
            .filter_map(|r| r.error.as_ref().map(|e| (r.source.as_path(), e)))
    }

    /// Get a human-readable summary of the batch.
    pub fn summary(&self) -> String {
        let action = match self.operation {
            OperationType::Copy => "Copied",
            OperationType::Move => "Moved",
            OperationType::Delete => "Deleted",
            OperationType::Rename => "Renamed",
        };
        let failed = self.failed_count();
        let succeeded = self.len() - failed;

        if failed == 0 {
            format!("{} {} items", action, succeeded)
        } else {
            format!("{} {} items, {} failed", action, succeeded, failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_succeeds() {
        let result = BatchResult::new(OperationType::Copy);
        assert!(result.all_succeeded());
        assert!(result.is_empty());
        assert_eq!(result.summary(), "Copied 0 items");
    }

    #[test]
    fn test_summary_with_failures() {
        let mut result = BatchResult::new(OperationType::Move);
        result.push(ItemResult::new("/a".into(), "/t/a".into(), None));
        result.push(ItemResult::new(
            "/b".into(),
            "/t/b".into(),
            Some(OpsError::DestinationExists { path: "/t/b".into() }),
        ));

        assert!(!result.all_succeeded());
        assert_eq!(result.summary(), "Moved 1 items, 1 failed");
        assert_eq!(
            result.succeeded_sources().collect::<Vec<_>>(),
            vec![Path::new("/a")]
        );
        assert_eq!(result.failures().count(), 1);
    }
}
