//! Pending clipboard for copy/cut/paste.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::BatchResult;

/// Clipboard mode determines paste behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardMode {
    /// Clipboard is empty.
    #[default]
    Empty,
    /// Items were staged for copy. Survives paste and `Esc`.
    Copy,
    /// Items were staged for move. Consumed by a successful paste,
    /// cancelled by `Esc`.
    Cut,
}

/// Items staged for copy or cut, in staging order.
#[derive(Debug, Clone, Default)]
pub struct ClipboardState {
    items: IndexSet<PathBuf>,
    mode: ClipboardMode,
    /// Bumped on every change of contents, so a paste result can tell
    /// whether the clipboard it was started from is still current.
    generation: u64,
}

/// Owned copy of the clipboard handed to a background paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    pub mode: ClipboardMode,
    pub items: Vec<PathBuf>,
    pub generation: u64,
}

impl ClipboardState {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Yank (copy) paths to the clipboard.
    pub fn yank(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.stage(paths, ClipboardMode::Copy);
    }

    /// Cut (move) paths to the clipboard.
    pub fn cut(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.stage(paths, ClipboardMode::Cut);
    }

    fn stage(&mut self, paths: impl IntoIterator<Item = PathBuf>, mode: ClipboardMode) {
        self.items = paths.into_iter().collect();
        self.mode = if self.items.is_empty() {
            ClipboardMode::Empty
        } else {
            mode
        };
        self.generation += 1;
    }

    /// Clear the clipboard.
    pub fn clear(&mut self) {
        self.items.clear();
        self.mode = ClipboardMode::Empty;
        self.generation += 1;
    }

    /// Cancel a pending cut. A copy clipboard is left alone.
    ///
    /// Returns whether anything was cleared.
    pub fn cancel_cut(&mut self) -> bool {
        if self.mode == ClipboardMode::Cut {
            self.clear();
            true
        } else {
            false
        }
    }

    /// Check if the clipboard is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the clipboard.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Current mode.
    pub fn mode(&self) -> ClipboardMode {
        self.mode
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Staged paths in staging order.
    pub fn items(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().map(PathBuf::as_path)
    }

    /// Check whether a path is staged.
    pub fn contains(&self, path: &Path) -> bool {
        self.items.contains(path)
    }

    /// Take an owned snapshot for a background paste.
    pub fn snapshot(&self) -> ClipboardSnapshot {
        ClipboardSnapshot {
            mode: self.mode,
            items: self.items.iter().cloned().collect(),
            generation: self.generation,
        }
    }

    /// Fold a paste result back into the clipboard.
    ///
    /// Only a cut clipboard that is still at `generation` is touched: the
    /// successfully moved sources are dropped, and the clipboard is cleared
    /// once nothing is left. Items that failed stay staged for a retry.
    /// Returns whether the clipboard changed.
    pub fn settle(&mut self, generation: u64, result: &BatchResult) -> bool {
        if self.mode != ClipboardMode::Cut || self.generation != generation {
            return false;
        }

        if result.all_succeeded() {
            self.clear();
            return true;
        }

        let before = self.items.len();
        for moved in result.succeeded_sources() {
            self.items.shift_remove(moved);
        }
        if self.items.is_empty() {
            self.clear();
            return true;
        }
        if self.items.len() != before {
            self.generation += 1;
            return true;
        }
        false
    }
}
