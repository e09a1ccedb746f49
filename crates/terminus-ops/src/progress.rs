//! Progress reporting types for file operations.

use std::path::PathBuf;

use crate::OperationType;

/// Progress information for an ongoing batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationProgress {
    /// The type of operation.
    pub operation: OperationType,
    /// Number of items that finished successfully.
    pub completed: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Total number of items in the batch.
    pub total: usize,
    /// The item currently being processed.
    pub current: Option<PathBuf>,
}

impl OperationProgress {
    /// Create a new progress tracker for a batch.
    pub fn new(operation: OperationType, total: usize) -> Self {
        Self {
            operation,
            completed: 0,
            failed: 0,
            total,
            current: None,
        }
    }

    /// Set the item being processed.
    pub fn set_current(&mut self, path: impl Into<PathBuf>) {
        self.current = Some(path.into());
    }

    /// Record one finished item.
    pub fn complete_item(&mut self, ok: bool) {
        if ok {
            self.completed += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Items processed so far, successful or not.
    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.processed() as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Check if every item has been processed.
    pub fn is_done(&self) -> bool {
        self.processed() >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_counts_failures() {
        let mut progress = OperationProgress::new(OperationType::Copy, 4);
        assert_eq!(progress.percentage(), 0.0);

        progress.complete_item(true);
        progress.complete_item(false);
        assert_eq!(progress.percentage(), 50.0);
        assert!(!progress.is_done());

        progress.complete_item(true);
        progress.complete_item(true);
        assert!(progress.is_done());
        assert_eq!(progress.completed, 3);
        assert_eq!(progress.failed, 1);
    }
}
