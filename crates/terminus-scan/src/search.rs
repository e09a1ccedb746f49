//! Recursive subtree search.
//!
//! Walks everything below a root with jwalk and streams case-insensitive
//! name matches back in batches. Dropping the receiver stops the walk.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use derive_builder::Builder;
use jwalk::WalkDir;
use serde::{Deserialize, Serialize};
use terminus_core::name_matches;
use tokio::sync::mpsc;
use tracing::debug;

/// Channel buffer size for search events.
pub const SEARCH_CHANNEL_SIZE: usize = 16;

/// Limits for a recursive search.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct SearchConfig {
    /// Stop after this many matches.
    #[builder(default = "1000")]
    pub max_results: usize,

    /// Maximum depth below the root (None = unlimited).
    #[builder(default)]
    pub max_depth: Option<usize>,

    /// Descend into and match hidden entries.
    #[builder(default = "false")]
    pub include_hidden: bool,

    /// Matches per [`SearchEvent::Matches`] message.
    #[builder(default = "64")]
    pub batch_size: usize,
}

impl SearchConfig {
    /// Create a new search config builder.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 1000,
            max_depth: None,
            include_hidden: false,
            batch_size: 64,
        }
    }
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub path: PathBuf,
    pub name: CompactString,
    pub is_dir: bool,
    /// Depth below the search root (1 = direct child).
    pub depth: usize,
}

impl SearchMatch {
    /// Path relative to `root`, for display.
    pub fn relative_to<'a>(&'a self, root: &Path) -> &'a Path {
        self.path.strip_prefix(root).unwrap_or(&self.path)
    }
}

/// Events streamed by a running search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// More matches, in walk order.
    Matches(Vec<SearchMatch>),
    /// The walk finished.
    Complete {
        total: usize,
        /// `max_results` was reached before the walk ended.
        truncated: bool,
    },
    /// The search could not start.
    Failed { message: String },
}

/// Start a search for `query` below `root`.
///
/// Matches arrive in a stable depth-first order. An empty query completes
/// immediately with no matches.
pub fn start_search(root: PathBuf, query: String, config: SearchConfig) -> mpsc::Receiver<SearchEvent> {
    let (tx, rx) = mpsc::channel(SEARCH_CHANNEL_SIZE);

    tokio::task::spawn_blocking(move || {
        run_search(&root, &query, &config, |event| tx.blocking_send(event).is_ok());
    });

    rx
}

/// Walk synchronously, handing each event to `emit`. Stops early when
/// `emit` returns false.
pub fn run_search(
    root: &Path,
    query: &str,
    config: &SearchConfig,
    mut emit: impl FnMut(SearchEvent) -> bool,
) {
    if query.is_empty() {
        emit(SearchEvent::Complete {
            total: 0,
            truncated: false,
        });
        return;
    }
    if !root.is_dir() {
        emit(SearchEvent::Failed {
            message: format!("Not a directory: {}", root.display()),
        });
        return;
    }

    let walker = WalkDir::new(root)
        .sort(true)
        .skip_hidden(!config.include_hidden)
        .follow_links(false)
        .min_depth(1)
        .max_depth(config.max_depth.unwrap_or(usize::MAX));

    let batch_size = config.batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0;
    let mut truncated = false;
    let mut skipped = 0usize;

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                skipped += 1;
                debug!(error = %err, "search skipped an unreadable entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy();
        if !name_matches(&name, query) {
            continue;
        }

        if total == config.max_results {
            truncated = true;
            break;
        }
        total += 1;
        batch.push(SearchMatch {
            name: CompactString::from(name.as_ref()),
            path: entry.path(),
            is_dir: entry.file_type().is_dir(),
            depth: entry.depth(),
        });

        if batch.len() == batch_size
            && !emit(SearchEvent::Matches(std::mem::take(&mut batch)))
        {
            debug!(root = %root.display(), query, "search abandoned");
            return;
        }
    }

    if !batch.is_empty() && !emit(SearchEvent::Matches(batch)) {
        return;
    }
    debug!(root = %root.display(), query, total, truncated, skipped, "search complete");
    emit(SearchEvent::Complete { total, truncated });
}
