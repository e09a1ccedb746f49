//! Core types and traits for terminus.
//!
//! This crate provides the fundamental data structures shared by the
//! operation engine, the listing/search engine and the mode machine:
//! filesystem entries, input modes, listing configuration, and the
//! [`FileSystem`] collaborator every filesystem-facing call goes through.

mod config;
mod entry;
mod error;
mod fs;
mod mode;

pub use config::{ListingConfig, ListingConfigBuilder};
pub use entry::{name_matches, Entry, EntryError, Timestamps};
pub use error::{CopyError, ListingError};
pub use fs::{is_cross_device, DirItem, FileSystem, LocalFs, Stat};
pub use mode::{Mode, ModeScope, UnknownMode};
