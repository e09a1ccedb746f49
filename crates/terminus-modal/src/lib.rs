//! Modal input for terminus.
//!
//! A keyboard-driven state machine with five modes (NORMAL, INSERT, VISUAL,
//! FILTER, SEARCH) and a declarative keybinding table.
//!
//! Data flows one way for input:
//!
//! 1. The presentation layer sends a [`KeyInput`].
//! 2. [`KeyTable`] resolves it for the active [`Mode`].
//! 3. [`ModalState::handle_key`] applies the transition and returns exactly
//!    one [`Action`].
//! 4. Mutations go to the operation engine; their outcomes, along with
//!    listings and search results, come back through
//!    [`ModalState::apply`].
//!
//! [`Mode`]: terminus_core::Mode

mod action;
mod buffer;
mod key;
mod keymap;
mod machine;
mod reduce;
mod state;

pub use action::{Action, Mutation, UiAction};
pub use buffer::{BufferEdit, CaretPolicy, TextBuffer};
pub use key::{normalize_key_label, KeyInput, Platform, CTRL_PREFIX};
pub use keymap::{
    ActionId, Binding, HelpGroup, KeyTable, KeymapError, Resolution, BUILTIN_KEYBINDS,
};
pub use reduce::{Followup, ModalEvent};
pub use state::{ModalSnapshot, ModalState, ModeError, RenameSession, SearchSession, Selection};

// Re-export core types for convenience
pub use terminus_core::{Mode, ModeScope};
