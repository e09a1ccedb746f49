//! Directory listing and recursive search for terminus.
//!
//! # Overview
//!
//! - [`list_directory`] reads one directory through a [`FileSystem`],
//!   stats every entry in parallel via rayon and returns them sorted. An
//!   entry whose stat fails is kept and marked, never dropped.
//! - [`start_search`] walks the subtree below a directory with jwalk and
//!   streams name matches over a channel, backing SEARCH mode.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use terminus_core::{ListingConfig, LocalFs};
//! use terminus_scan::list_directory;
//!
//! # async fn demo() -> Result<(), terminus_core::ListingError> {
//! let entries = list_directory(Arc::new(LocalFs::new()), "/tmp".into(), ListingConfig::default()).await?;
//! for entry in &entries {
//!     println!("{} {}", if entry.is_directory { "d" } else { "-" }, entry.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`FileSystem`]: terminus_core::FileSystem

mod listing;
mod search;

pub use listing::{list_directory, read_listing, sort_entries};
pub use search::{
    run_search, start_search, SearchConfig, SearchConfigBuilder, SearchEvent, SearchMatch,
    SEARCH_CHANNEL_SIZE,
};

// Re-export core types for convenience
pub use terminus_core::{Entry, EntryError, ListingConfig, ListingError};
