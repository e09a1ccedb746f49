//! Actions emitted by the mode machine.

use std::path::PathBuf;

use terminus_core::Mode;
use terminus_ops::{ClipboardMode, ClipboardSnapshot, DeleteTarget, Job, PastePolicy};

/// Exactly one of these is produced for every key event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// State changed (or was inspected) without touching the filesystem.
    Ui(UiAction),
    /// A filesystem mutation for the operation engine.
    Mutation(Mutation),
    /// No binding and no buffer use. A silent no-op.
    Unrecognized,
}

/// Pure UI outcomes. Some ask the presentation layer for a read-only
/// follow-up (a listing or a search), none mutate the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// The cursor moved within the current view.
    CursorMoved { index: usize },
    /// List `dir`; when it arrives, put the cursor on `focus` if present.
    Navigate { dir: PathBuf, focus: Option<PathBuf> },
    /// The focused entry is a file; open it.
    OpenFile { path: PathBuf },
    /// The active mode changed.
    ModeChanged { from: Mode, to: Mode },
    /// Entering `requested` was refused because `active` is open.
    ModeRejected { active: Mode, requested: Mode },
    /// A VISUAL selection toggle.
    SelectionToggled { path: PathBuf, selected: bool },
    /// The rename buffer changed.
    BufferEdited,
    /// The filter query changed; `visible` entries match.
    FilterUpdated { visible: usize },
    /// Start (or restart) a search. Results carry `generation`.
    SearchRequested {
        root: PathBuf,
        query: String,
        generation: u64,
    },
    /// The search result cursor moved.
    SearchCursorMoved { index: usize },
    /// A pending cut was cancelled.
    ClipboardCleared,
    /// A rename commit was refused before reaching the filesystem.
    RenameRejected { reason: String },
    /// The help overlay was shown or hidden.
    HelpToggled { visible: bool },
    /// A recognized key that had nothing to act on.
    Idle,
    /// Leave the program.
    Quit,
}

/// File operations. Everything except `Stage` is routed to the operation
/// engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Paths were staged on the clipboard for copy or cut. The clipboard
    /// is already updated; there is no filesystem work.
    Stage {
        mode: ClipboardMode,
        paths: Vec<PathBuf>,
    },
    /// Paste a clipboard snapshot into `target`.
    Paste {
        clipboard: ClipboardSnapshot,
        target: PathBuf,
    },
    /// Delete targets in order.
    Delete { targets: Vec<DeleteTarget> },
    /// Rename `path` within its parent.
    Rename { path: PathBuf, new_name: String },
}

impl Mutation {
    /// Turn into an executor job. Staging has none.
    pub fn into_job(self, policy: PastePolicy) -> Option<Job> {
        match self {
            Self::Stage { .. } => None,
            Self::Paste { clipboard, target } => Some(Job::Paste {
                clipboard,
                target,
                policy,
            }),
            Self::Delete { targets } => Some(Job::Delete { targets }),
            Self::Rename { path, new_name } => Some(Job::Rename { path, new_name }),
        }
    }
}

impl Action {
    /// Whether this action asks for a filesystem mutation.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Mutation(_))
    }
}
