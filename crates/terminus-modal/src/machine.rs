//! Key handling: one key in, one action out.
//!
//! Nothing here suspends or touches the filesystem. Mutations are returned
//! to the caller, which runs them and feeds the outcome back through
//! [`ModalState::apply`](crate::ModalState::apply).

use std::path::PathBuf;

use terminus_core::Mode;
use terminus_ops::{validate_filename, ClipboardMode, DeleteTarget};
use tracing::debug;

use crate::action::{Action, Mutation, UiAction};
use crate::buffer::{BufferEdit, TextBuffer};
use crate::key::KeyInput;
use crate::keymap::{ActionId, KeyTable};
use crate::state::{ModalState, RenameSession};

impl ModalState {
    /// Route one key event.
    ///
    /// The table decides what the key means in the current mode. Keys with
    /// no binding edit the active text buffer in INSERT, FILTER and SEARCH,
    /// and are [`Action::Unrecognized`] elsewhere.
    pub fn handle_key(&mut self, table: &KeyTable, input: &KeyInput) -> Action {
        self.last_error = None;
        self.status = None;

        if self.help_visible {
            self.help_visible = false;
            return Action::Ui(UiAction::HelpToggled { visible: false });
        }

        match table.lookup_input(input, self.mode).and_then(|b| b.action) {
            Some(id) => {
                debug!(mode = %self.mode, key = %input.match_key(), action = %id, "key resolved");
                self.dispatch(id)
            }
            None if self.mode.accepts_text() => self.edit_buffer(input),
            None => Action::Unrecognized,
        }
    }

    /// Apply a resolved action to the state.
    pub fn dispatch(&mut self, id: ActionId) -> Action {
        match id {
            ActionId::MoveDown => self.step_cursor(1),
            ActionId::MoveUp => self.step_cursor(-1),
            ActionId::Top => self.jump_cursor(0),
            ActionId::Bottom => self.jump_cursor(self.view.len().saturating_sub(1)),
            ActionId::Open => self.open_focused(),
            ActionId::Parent => self.go_parent(),
            ActionId::Home => self.go_home(),

            ActionId::Copy => self.stage(ClipboardMode::Copy),
            ActionId::Cut => self.stage(ClipboardMode::Cut),
            ActionId::Paste => self.paste(),
            ActionId::Delete => self.delete(),

            ActionId::Rename => self.start_rename(),
            ActionId::RenameCommit => self.commit_rename(),
            ActionId::RenameCancel | ActionId::VisualCancel | ActionId::FilterExit => {
                self.leave_mode()
            }
            ActionId::CutCancel => {
                if self.clipboard.cancel_cut() {
                    self.status = Some("Cut cancelled".into());
                    Action::Ui(UiAction::ClipboardCleared)
                } else {
                    Action::Ui(UiAction::Idle)
                }
            }
            ActionId::Visual => {
                if self.mode == Mode::Visual {
                    self.leave_mode()
                } else {
                    self.start_visual()
                }
            }
            ActionId::ToggleSelect => self.toggle_focused(),

            ActionId::Filter => self.open_mode(Mode::Filter, |state| {
                state.filter.clear();
                state.rebuild_view();
            }),
            ActionId::Search => self.start_search(),
            ActionId::SearchCancel => self.leave_mode(),
            ActionId::SearchNext => self.step_search(1),
            ActionId::SearchPrev => self.step_search(-1),
            ActionId::Reveal => self.reveal(),

            ActionId::Help => {
                self.help_visible = true;
                Action::Ui(UiAction::HelpToggled { visible: true })
            }
            ActionId::Quit => Action::Ui(UiAction::Quit),
        }
    }

    fn edit_buffer(&mut self, input: &KeyInput) -> Action {
        match self.mode {
            Mode::Insert => {
                let Some(session) = self.rename.as_mut() else {
                    return Action::Unrecognized;
                };
                match session.buffer.handle_key(input) {
                    BufferEdit::Ignored => Action::Unrecognized,
                    _ => Action::Ui(UiAction::BufferEdited),
                }
            }
            Mode::Filter => match self.filter.handle_key(input) {
                BufferEdit::Edited => {
                    self.rebuild_view();
                    Action::Ui(UiAction::FilterUpdated {
                        visible: self.view.len(),
                    })
                }
                BufferEdit::Moved => Action::Ui(UiAction::BufferEdited),
                BufferEdit::Ignored => Action::Unrecognized,
            },
            Mode::Search => match self.search.query.handle_key(input) {
                BufferEdit::Edited => self.request_search(),
                BufferEdit::Moved => Action::Ui(UiAction::BufferEdited),
                BufferEdit::Ignored => Action::Unrecognized,
            },
            Mode::Normal | Mode::Visual => Action::Unrecognized,
        }
    }

    // Modes

    fn open_mode(&mut self, to: Mode, seed: impl FnOnce(&mut Self)) -> Action {
        match self.enter_mode(to) {
            Ok(from) => {
                seed(self);
                Action::Ui(UiAction::ModeChanged { from, to })
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Action::Ui(UiAction::ModeRejected {
                    active: self.mode,
                    requested: to,
                })
            }
        }
    }

    fn leave_mode(&mut self) -> Action {
        let from = self.exit_to_normal();
        if from == Mode::Normal {
            return Action::Ui(UiAction::Idle);
        }
        Action::Ui(UiAction::ModeChanged {
            from,
            to: Mode::Normal,
        })
    }

    fn start_visual(&mut self) -> Action {
        let focused = self.focused().map(|e| e.path.clone());
        self.open_mode(Mode::Visual, |state| {
            state.selection.multi.clear();
            state.selection.multi.extend(focused);
        })
    }

    fn start_rename(&mut self) -> Action {
        let Some(entry) = self.focused() else {
            return Action::Ui(UiAction::Idle);
        };
        let session = RenameSession {
            path: entry.path.clone(),
            original: entry.name.to_string(),
            buffer: TextBuffer::for_rename(&entry.name, self.caret_policy),
        };
        self.open_mode(Mode::Insert, |state| state.rename = Some(session))
    }

    fn commit_rename(&mut self) -> Action {
        let Some(session) = self.rename.as_ref() else {
            return self.leave_mode();
        };
        let new_name = session.buffer.text().to_string();
        let path = session.path.clone();

        if new_name == session.original {
            return self.leave_mode();
        }
        // An invalid name keeps INSERT open so it can be fixed.
        if let Err(reason) = validate_filename(&new_name) {
            self.last_error = Some(reason.clone());
            return Action::Ui(UiAction::RenameRejected { reason });
        }

        self.exit_to_normal();
        Action::Mutation(Mutation::Rename { path, new_name })
    }

    fn start_search(&mut self) -> Action {
        let changed = self.open_mode(Mode::Search, |_| {});
        if !matches!(changed, Action::Ui(UiAction::ModeChanged { .. })) {
            return changed;
        }
        // Re-entry re-runs the kept query against the current directory.
        if self.search.query.is_empty() {
            changed
        } else {
            self.request_search()
        }
    }

    fn request_search(&mut self) -> Action {
        let root = self.cwd.clone();
        let query = self.search.query.text().to_string();
        let root_for_results = (!query.is_empty()).then(|| root.clone());
        let generation = self.search.restart(root_for_results);
        Action::Ui(UiAction::SearchRequested {
            root,
            query,
            generation,
        })
    }

    // Cursor and selection

    fn step_cursor(&mut self, delta: isize) -> Action {
        let len = self.view.len();
        if len == 0 {
            return Action::Ui(UiAction::Idle);
        }
        let current = self.selection.cursor;
        let next = current.saturating_add_signed(delta).min(len - 1);
        if next == current {
            return Action::Ui(UiAction::Idle);
        }
        self.selection.cursor = next;

        if self.mode == Mode::Visual {
            return self.toggle_focused();
        }
        Action::Ui(UiAction::CursorMoved { index: next })
    }

    fn jump_cursor(&mut self, index: usize) -> Action {
        if self.view.is_empty() || index == self.selection.cursor {
            return Action::Ui(UiAction::Idle);
        }
        self.selection.cursor = index;
        Action::Ui(UiAction::CursorMoved { index })
    }

    fn toggle_focused(&mut self) -> Action {
        let Some(path) = self.focused().map(|e| e.path.clone()) else {
            return Action::Ui(UiAction::Idle);
        };
        let selected = if self.selection.multi.shift_remove(&path) {
            false
        } else {
            self.selection.multi.insert(path.clone());
            true
        };
        Action::Ui(UiAction::SelectionToggled { path, selected })
    }

    // Navigation

    fn open_focused(&mut self) -> Action {
        let Some(entry) = self.focused() else {
            return Action::Ui(UiAction::Idle);
        };
        let path = entry.path.clone();

        if entry.is_directory {
            // Entering a directory ends the filter.
            if self.mode == Mode::Filter {
                self.exit_to_normal();
            }
            return Action::Ui(UiAction::Navigate {
                dir: path,
                focus: None,
            });
        }
        if entry.is_file {
            return Action::Ui(UiAction::OpenFile { path });
        }
        if let Some(error) = entry.error {
            self.last_error = Some(format!("{}: {error}", entry.name));
        }
        Action::Ui(UiAction::Idle)
    }

    fn go_parent(&mut self) -> Action {
        match self.cwd.parent() {
            Some(parent) => Action::Ui(UiAction::Navigate {
                dir: parent.to_path_buf(),
                focus: Some(self.cwd.clone()),
            }),
            None => Action::Ui(UiAction::Idle),
        }
    }

    fn go_home(&mut self) -> Action {
        match &self.home {
            Some(home) => Action::Ui(UiAction::Navigate {
                dir: home.clone(),
                focus: None,
            }),
            None => {
                self.last_error = Some("Home directory is not available".into());
                Action::Ui(UiAction::Idle)
            }
        }
    }

    fn step_search(&mut self, delta: isize) -> Action {
        let len = self.search.results.len();
        if len == 0 {
            return Action::Ui(UiAction::Idle);
        }
        let index = self
            .search
            .cursor
            .saturating_add_signed(delta)
            .min(len - 1);
        self.search.cursor = index;
        Action::Ui(UiAction::SearchCursorMoved { index })
    }

    fn reveal(&mut self) -> Action {
        let Some(hit) = self.search.selected() else {
            return Action::Ui(UiAction::Idle);
        };
        let focus = hit.path.clone();
        let Some(dir) = focus.parent().map(PathBuf::from) else {
            return Action::Ui(UiAction::Idle);
        };
        self.exit_to_normal();
        Action::Ui(UiAction::Navigate {
            dir,
            focus: Some(focus),
        })
    }

    // File operations

    fn stage(&mut self, mode: ClipboardMode) -> Action {
        let paths: Vec<PathBuf> = self.targets().iter().map(|e| e.path.clone()).collect();
        if paths.is_empty() {
            return Action::Ui(UiAction::Idle);
        }

        match mode {
            ClipboardMode::Cut => self.clipboard.cut(paths.iter().cloned()),
            _ => self.clipboard.yank(paths.iter().cloned()),
        }
        let verb = if mode == ClipboardMode::Cut { "cut" } else { "copied" };
        self.status = Some(format!("{} item(s) {verb}", paths.len()));

        if self.mode == Mode::Visual {
            self.exit_to_normal();
        }
        Action::Mutation(Mutation::Stage { mode, paths })
    }

    fn paste(&mut self) -> Action {
        if self.clipboard.is_empty() {
            self.status = Some("Clipboard is empty".into());
            return Action::Ui(UiAction::Idle);
        }
        Action::Mutation(Mutation::Paste {
            clipboard: self.clipboard.snapshot(),
            target: self.cwd.clone(),
        })
    }

    fn delete(&mut self) -> Action {
        let targets: Vec<DeleteTarget> = self
            .targets()
            .iter()
            .map(|e| DeleteTarget::new(e.path.clone(), e.is_directory))
            .collect();
        if targets.is_empty() {
            return Action::Ui(UiAction::Idle);
        }

        if self.mode == Mode::Visual {
            self.exit_to_normal();
        }
        Action::Mutation(Mutation::Delete { targets })
    }
}
