//! The single state value owned by the mode machine.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use terminus_core::{Entry, Mode};
use terminus_ops::{ClipboardSnapshot, ClipboardState, JobId, OperationProgress};
use terminus_scan::SearchMatch;
use thiserror::Error;

use crate::buffer::{CaretPolicy, TextBuffer};

/// A mode transition the machine refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModeError {
    /// Only NORMAL may open another mode.
    #[error("Cannot enter {requested} while {active} is active")]
    AlreadyActive { active: Mode, requested: Mode },
}

/// Cursor plus the VISUAL multi-selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Index into the visible entries.
    pub cursor: usize,
    /// Selected paths. Only non-empty while VISUAL is active.
    pub multi: IndexSet<PathBuf>,
}

/// An open rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSession {
    pub path: PathBuf,
    pub original: String,
    pub buffer: TextBuffer,
}

/// SEARCH mode state. The query survives leaving SEARCH; results do not.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    pub query: TextBuffer,
    /// Identifies the search whose results are current.
    pub generation: u64,
    pub root: Option<PathBuf>,
    pub results: Vec<SearchMatch>,
    pub cursor: usize,
    pub running: bool,
    pub truncated: bool,
}

impl SearchSession {
    /// The match under the result cursor.
    pub fn selected(&self) -> Option<&SearchMatch> {
        self.results.get(self.cursor)
    }

    /// Start a new generation, dropping current results.
    pub(crate) fn restart(&mut self, root: Option<PathBuf>) -> u64 {
        self.generation += 1;
        self.root = root;
        self.results.clear();
        self.cursor = 0;
        self.truncated = false;
        self.running = self.root.is_some();
        self.generation
    }
}

/// What the presentation layer renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalSnapshot {
    pub mode: Mode,
    pub cwd: PathBuf,
    pub cursor: usize,
    pub selected: Vec<PathBuf>,
    pub clipboard: ClipboardSnapshot,
    pub last_error: Option<String>,
}

/// Everything the mode machine owns. Changed only by
/// [`ModalState::handle_key`] and [`ModalState::apply`].
#[derive(Debug, Clone, Default)]
pub struct ModalState {
    pub(crate) mode: Mode,
    pub(crate) cwd: PathBuf,
    pub(crate) home: Option<PathBuf>,
    pub(crate) entries: Vec<Entry>,
    /// Indices into `entries` that are visible, in listing order.
    pub(crate) view: Vec<usize>,
    pub(crate) selection: Selection,
    pub(crate) clipboard: ClipboardState,
    pub(crate) rename: Option<RenameSession>,
    pub(crate) filter: TextBuffer,
    pub(crate) search: SearchSession,
    pub(crate) last_error: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) help_visible: bool,
    /// Latest progress of each running job, in start order.
    pub(crate) progress: IndexMap<JobId, OperationProgress>,
    /// Path to focus once the next listing of `cwd` arrives.
    pub(crate) pending_focus: Option<PathBuf>,
    pub(crate) caret_policy: CaretPolicy,
}

impl ModalState {
    /// Create a state for `cwd` with no listing yet.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Default::default()
        }
    }

    /// Set where the rename caret starts.
    pub fn with_caret_policy(mut self, policy: CaretPolicy) -> Self {
        self.caret_policy = policy;
        self
    }

    /// Set the directory the `home` action goes to.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The full listing of `cwd`, unaffected by the filter.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries currently visible, in listing order.
    pub fn visible(&self) -> impl Iterator<Item = &Entry> {
        self.view.iter().map(|&i| &self.entries[i])
    }

    pub fn visible_len(&self) -> usize {
        self.view.len()
    }

    pub fn cursor(&self) -> usize {
        self.selection.cursor
    }

    /// The entry under the cursor.
    pub fn focused(&self) -> Option<&Entry> {
        self.view
            .get(self.selection.cursor)
            .map(|&i| &self.entries[i])
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selection.multi.contains(path)
    }

    pub fn clipboard(&self) -> &ClipboardState {
        &self.clipboard
    }

    pub fn rename_session(&self) -> Option<&RenameSession> {
        self.rename.as_ref()
    }

    pub fn filter_query(&self) -> &str {
        self.filter.text()
    }

    pub fn filter_buffer(&self) -> &TextBuffer {
        &self.filter
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    /// Progress of the most recently started job still running.
    pub fn progress(&self) -> Option<&OperationProgress> {
        self.progress.values().last()
    }

    /// Number of jobs that have reported progress and not yet finished.
    pub fn running_jobs(&self) -> usize {
        self.progress.len()
    }

    /// Report a presentation-side failure (e.g. a file that would not open).
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Take a snapshot for rendering.
    pub fn snapshot(&self) -> ModalSnapshot {
        ModalSnapshot {
            mode: self.mode,
            cwd: self.cwd.clone(),
            cursor: self.selection.cursor,
            selected: self.selection.multi.iter().cloned().collect(),
            clipboard: self.clipboard.snapshot(),
            last_error: self.last_error.clone(),
        }
    }

    /// Open `to`. Only NORMAL may open another mode; anything else would
    /// leave two edit sessions open at once.
    pub fn enter_mode(&mut self, to: Mode) -> Result<Mode, ModeError> {
        let from = self.mode;
        if from != Mode::Normal && to != Mode::Normal {
            return Err(ModeError::AlreadyActive {
                active: from,
                requested: to,
            });
        }
        self.mode = to;
        Ok(from)
    }

    /// Close the active mode and release what it owns. Returns the mode
    /// that was closed.
    pub(crate) fn exit_to_normal(&mut self) -> Mode {
        let from = self.mode;
        match from {
            Mode::Normal => {}
            Mode::Insert => self.rename = None,
            Mode::Visual => self.selection.multi.clear(),
            Mode::Filter => {
                self.filter.clear();
                self.rebuild_view();
            }
            Mode::Search => {
                // Late results for the closed search are ignored.
                self.search.restart(None);
            }
        }
        self.mode = Mode::Normal;
        from
    }

    /// Recompute the visible entries from the filter, keeping the cursor
    /// on the same entry when it stays visible.
    pub(crate) fn rebuild_view(&mut self) {
        let focused = self.focused().map(|e| e.path.clone());
        self.refilter();
        self.selection.cursor = focused
            .and_then(|p| self.position_of(&p))
            .unwrap_or(0);
    }

    /// Swap in a new listing of `cwd`. The cursor follows its entry, or
    /// stays at the same index when that entry is gone.
    pub(crate) fn replace_entries(&mut self, entries: Vec<Entry>) {
        let focused = self.focused().map(|e| e.path.clone());
        let cursor = self.selection.cursor;

        self.entries = entries;
        self.refilter();
        self.selection.cursor = focused
            .and_then(|p| self.position_of(&p))
            .unwrap_or(cursor);
        self.clamp_cursor();
    }

    fn refilter(&mut self) {
        let query = self.filter.text();
        self.view = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(query))
            .map(|(i, _)| i)
            .collect();
    }

    pub(crate) fn clamp_cursor(&mut self) {
        let last = self.view.len().saturating_sub(1);
        self.selection.cursor = self.selection.cursor.min(last);
    }

    /// Visible index of `path`.
    pub(crate) fn position_of(&self, path: &Path) -> Option<usize> {
        self.view.iter().position(|&i| self.entries[i].path == path)
    }

    /// Paths an operation applies to: the VISUAL selection in listing
    /// order, or the focused entry.
    pub(crate) fn targets(&self) -> Vec<&Entry> {
        if self.mode == Mode::Visual && !self.selection.multi.is_empty() {
            return self
                .entries
                .iter()
                .filter(|e| self.selection.multi.contains(&e.path))
                .collect();
        }
        self.focused().into_iter().collect()
    }
}
