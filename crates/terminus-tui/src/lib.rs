//! Terminal front-end for terminus.
//!
//! This crate is the presentation collaborator of the mode machine: it
//! turns terminal key events into [`KeyInput`](terminus_modal::KeyInput)s,
//! runs the actions they produce (listings, searches, file operations) in
//! the background, feeds every result back through
//! [`ModalState::apply`](terminus_modal::ModalState::apply), and draws the
//! state with ratatui.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use terminus_tui::UserSettings;
//!
//! let settings = UserSettings::load();
//! let table = settings.key_table().unwrap();
//! terminus_tui::run(PathBuf::from("/path/to/browse"), settings, table).unwrap();
//! ```

pub mod app;
mod event;
mod settings;
mod theme;
mod ui;

pub use app::{App, AppResult};
pub use event::key_input;
pub use settings::UserSettings;
pub use theme::{Theme, ThemeVariant};

use std::path::PathBuf;

use terminus_modal::KeyTable;

/// Run the TUI application.
pub fn run(path: PathBuf, settings: UserSettings, table: KeyTable) -> AppResult<()> {
    let rt = tokio::runtime::Runtime::new()?;

    let terminal = ratatui::init();
    let result = rt.block_on(App::new(path, settings, table).run(terminal));
    ratatui::restore();

    // Background jobs still running are abandoned.
    rt.shutdown_timeout(std::time::Duration::from_millis(100));

    result
}
