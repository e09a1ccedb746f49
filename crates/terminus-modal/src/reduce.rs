//! The single entry point for asynchronous results.
//!
//! Listings, search results and operation outcomes all arrive as
//! [`ModalEvent`]s and are folded in by [`ModalState::apply`], so a slow
//! batch finishing can never race a newer key-driven change.

use std::path::PathBuf;

use terminus_core::{Entry, Mode};
use terminus_ops::{BatchResult, JobId, JobOutcome, OperationProgress};
use terminus_scan::SearchMatch;
use tracing::{debug, warn};

use crate::state::ModalState;

/// Results delivered back to the mode machine.
#[derive(Debug)]
pub enum ModalEvent {
    /// A navigation finished listing `dir`.
    Listed {
        dir: PathBuf,
        entries: Vec<Entry>,
        focus: Option<PathBuf>,
    },
    /// The current directory was re-read after a mutation.
    Refreshed { dir: PathBuf, entries: Vec<Entry> },
    /// Listing `dir` failed.
    ListingFailed { dir: PathBuf, message: String },
    /// More matches for search `generation`.
    SearchMatches {
        generation: u64,
        matches: Vec<SearchMatch>,
    },
    /// Search `generation` finished.
    SearchFinished {
        generation: u64,
        total: usize,
        truncated: bool,
    },
    /// Search `generation` could not run.
    SearchFailed { generation: u64, message: String },
    /// A running job reported progress.
    Progress {
        job: JobId,
        progress: OperationProgress,
    },
    /// A job finished.
    Operation { job: JobId, outcome: JobOutcome },
}

/// Work the caller should start after an event is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    None,
    /// Re-read this directory and send [`ModalEvent::Refreshed`].
    Refresh(PathBuf),
}

impl ModalState {
    /// Fold an asynchronous result into the state.
    pub fn apply(&mut self, event: ModalEvent) -> Followup {
        match event {
            ModalEvent::Listed {
                dir,
                entries,
                focus,
            } => {
                self.on_listed(dir, entries, focus);
                Followup::None
            }
            ModalEvent::Refreshed { dir, entries } => {
                if dir == self.cwd {
                    self.on_refreshed(entries);
                } else {
                    debug!(dir = %dir.display(), "dropping stale refresh");
                }
                Followup::None
            }
            ModalEvent::ListingFailed { dir, message } => {
                self.last_error = Some(format!("{}: {message}", dir.display()));
                Followup::None
            }
            ModalEvent::SearchMatches {
                generation,
                matches,
            } => {
                if self.is_current_search(generation) {
                    self.search.results.extend(matches);
                }
                Followup::None
            }
            ModalEvent::SearchFinished {
                generation,
                total,
                truncated,
            } => {
                if self.is_current_search(generation) {
                    self.search.running = false;
                    self.search.truncated = truncated;
                    debug!(generation, total, truncated, "search finished");
                }
                Followup::None
            }
            ModalEvent::SearchFailed {
                generation,
                message,
            } => {
                if self.is_current_search(generation) {
                    self.search.running = false;
                    self.last_error = Some(message);
                }
                Followup::None
            }
            ModalEvent::Progress { job, progress } => {
                self.progress.insert(job, progress);
                Followup::None
            }
            ModalEvent::Operation { job, outcome } => {
                self.progress.shift_remove(&job);
                self.on_outcome(outcome)
            }
        }
    }

    fn is_current_search(&self, generation: u64) -> bool {
        self.mode == Mode::Search && self.search.generation == generation
    }

    fn on_listed(&mut self, dir: PathBuf, entries: Vec<Entry>, focus: Option<PathBuf>) {
        let changed_dir = dir != self.cwd;

        // Every completed navigation lands in NORMAL.
        self.exit_to_normal();
        self.help_visible = false;
        if changed_dir {
            self.selection.multi.clear();
            self.selection.cursor = 0;
        }

        self.cwd = dir;
        self.replace_entries(entries);

        let focus = focus.or_else(|| self.pending_focus.take());
        if let Some(index) = focus.and_then(|p| self.position_of(&p)) {
            self.selection.cursor = index;
        }
    }

    fn on_refreshed(&mut self, entries: Vec<Entry>) {
        self.replace_entries(entries);

        if let Some(index) = self
            .pending_focus
            .take()
            .and_then(|p| self.position_of(&p))
        {
            self.selection.cursor = index;
        }

        let entries = &self.entries;
        self.selection
            .multi
            .retain(|path| entries.iter().any(|e| &e.path == path));
    }

    fn on_outcome(&mut self, outcome: JobOutcome) -> Followup {
        match outcome {
            JobOutcome::Pasted {
                generation, result, ..
            } => {
                // No-op unless this was a cut of the clipboard as it is now.
                self.clipboard.settle(generation, &result);
                self.report_batch(&result);
            }
            JobOutcome::Deleted { result } => {
                self.report_batch(&result);
            }
            JobOutcome::Renamed { from, result } => match result {
                Ok(new_path) => {
                    let name = new_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.status = Some(format!("Renamed to {name}"));
                    self.pending_focus = Some(new_path);
                }
                Err(e) => {
                    warn!(path = %from.display(), error = %e, "rename failed");
                    self.last_error = Some(e.to_string());
                    return Followup::None;
                }
            },
        }
        Followup::Refresh(self.cwd.clone())
    }

    fn report_batch(&mut self, result: &BatchResult) {
        self.status = Some(result.summary());

        let mut failures = result.failures();
        if let Some((path, error)) = failures.next() {
            let more = failures.count();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            self.last_error = Some(if more == 0 {
                format!("{name}: {error}")
            } else {
                format!("{name}: {error} (and {more} more)")
            });
        }
    }
}
