//! Single-directory listing with concurrent stat.

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use terminus_core::{DirItem, Entry, EntryError, FileSystem, ListingConfig, ListingError};
use tracing::{debug, warn};

/// List `dir` on the blocking pool.
///
/// One suspension point for the caller: every entry's stat has finished or
/// failed by the time this returns.
pub async fn list_directory(
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
    config: ListingConfig,
) -> Result<Vec<Entry>, ListingError> {
    tokio::task::spawn_blocking(move || read_listing(fs.as_ref(), &dir, &config))
        .await
        .map_err(|e| ListingError::Other {
            message: format!("listing task failed: {e}"),
        })?
}

/// List `dir` synchronously.
///
/// Entries whose stat fails are kept, marked with an error, and carry the
/// type reported by the directory read.
pub fn read_listing(
    fs: &dyn FileSystem,
    dir: &Path,
    config: &ListingConfig,
) -> Result<Vec<Entry>, ListingError> {
    let stat = fs.stat(dir).map_err(|e| ListingError::io(dir, e))?;
    if !stat.is_dir {
        return Err(ListingError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let items: Vec<DirItem> = fs
        .read_dir(dir)
        .map_err(|e| ListingError::io(dir, e))?
        .into_iter()
        .filter(|item| {
            let name = item
                .path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            !config.should_skip_hidden(&name)
        })
        .collect();

    let mut entries = stat_all(fs, items, config.stat_concurrency);
    sort_entries(&mut entries, config.dirs_first);

    debug!(
        dir = %dir.display(),
        entries = entries.len(),
        unreadable = entries.iter().filter(|e| e.has_error()).count(),
        "listed directory"
    );
    Ok(entries)
}

fn stat_all(fs: &dyn FileSystem, items: Vec<DirItem>, threads: usize) -> Vec<Entry> {
    let stat_one = |item: DirItem| match fs.stat(&item.path) {
        Ok(stat) => Entry::from_stat(item.path, &stat),
        Err(e) => {
            debug!(path = %item.path.display(), error = %e, "stat failed");
            Entry::unreadable(item.path, item.is_dir, item.is_file, entry_error(&e))
        }
    };

    if threads == 0 {
        return items.into_par_iter().map(stat_one).collect();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(|| items.into_par_iter().map(stat_one).collect()),
        Err(e) => {
            warn!(error = %e, threads, "failed to build stat pool, using the global pool");
            items.into_par_iter().map(stat_one).collect()
        }
    }
}

fn entry_error(err: &io::Error) -> EntryError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => EntryError::PermissionDenied,
        _ => EntryError::Stat,
    }
}

/// Sort directories first (when asked), then by case-insensitive name.
pub fn sort_entries(entries: &mut [Entry], dirs_first: bool) {
    entries.sort_by(|a, b| {
        let by_kind = if dirs_first {
            b.is_directory.cmp(&a.is_directory)
        } else {
            Ordering::Equal
        };
        by_kind
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminus_core::LocalFs;

    #[test]
    fn test_sort_dirs_first_case_insensitive() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.txt"), b"").unwrap();
        std::fs::write(temp.path().join("A.txt"), b"").unwrap();
        std::fs::create_dir(temp.path().join("zeta")).unwrap();

        let entries = read_listing(&LocalFs, temp.path(), &ListingConfig::default()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "A.txt", "b.txt"]);
    }

    #[test]
    fn test_listing_a_file_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, b"").unwrap();

        let err = read_listing(&LocalFs, &file, &ListingConfig::default()).unwrap_err();
        assert!(matches!(err, ListingError::NotADirectory { .. }));
    }
}
