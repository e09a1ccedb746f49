//! Path and collision utilities.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use terminus_core::FileSystem;

use crate::OpsError;

/// Destination for `source` when placed inside `target_dir`.
pub fn destination_in(target_dir: &Path, source: &Path) -> PathBuf {
    target_dir.join(source.file_name().unwrap_or_default())
}

/// Check whether `destination` lies strictly inside `source`.
pub fn is_into_itself(source: &Path, destination: &Path) -> bool {
    destination != source && destination.starts_with(source)
}

pub(crate) fn ensure_not_into_itself(source: &Path, destination: &Path) -> Result<(), OpsError> {
    if is_into_itself(source, destination) {
        return Err(OpsError::SourceIsAncestor {
            path: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    Ok(())
}

/// Derive a destination name that nothing occupies.
///
/// For "file.txt", tries "file (1).txt", "file (2).txt", etc. Paths in
/// `reserved` count as occupied, so names picked earlier in the same batch
/// are not handed out twice.
pub fn non_conflicting_path(
    fs: &dyn FileSystem,
    path: &Path,
    reserved: &HashSet<PathBuf>,
) -> PathBuf {
    let taken = |p: &Path| fs.exists(p) || reserved.contains(p);
    if !taken(path) {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or(Path::new(""));
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let extension = path.extension().and_then(|e| e.to_str());

    for i in 1..1000 {
        let new_name = if let Some(ext) = extension {
            format!("{} ({}).{}", stem, i, ext)
        } else {
            format!("{} ({})", stem, i)
        };

        let new_path = parent.join(&new_name);
        if !taken(&new_path) {
            return new_path;
        }
    }

    // Fallback: use timestamp
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let new_name = if let Some(ext) = extension {
        format!("{}_{}.{}", stem, timestamp, ext)
    } else {
        format!("{}_{}", stem, timestamp)
    };

    parent.join(&new_name)
}

/// Sibling path used to stage a replacement before the original is removed.
pub(crate) fn staging_path(fs: &dyn FileSystem, destination: &Path, tag: &str) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staged = destination.with_file_name(format!(".{name}.terminus-{tag}"));
    non_conflicting_path(fs, &staged, &HashSet::new())
}

/// Remove whatever occupies `path`: a directory tree or a single file/link.
pub(crate) fn remove_existing(fs: &dyn FileSystem, path: &Path) -> std::io::Result<()> {
    match fs.stat(path) {
        Ok(stat) if stat.is_dir && !stat.is_symlink => fs.remove_dir_all(path),
        // Files, links (including dangling ones whose stat fails).
        _ => fs.remove_file(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminus_core::LocalFs;

    #[test]
    fn test_non_conflicting_free_path_is_unchanged() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("test.txt");
        assert_eq!(non_conflicting_path(&LocalFs, &path, &HashSet::new()), path);
    }

    #[test]
    fn test_non_conflicting_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("test.txt");
        std::fs::write(&path, b"x").unwrap();

        let renamed = non_conflicting_path(&LocalFs, &path, &HashSet::new());
        assert_eq!(renamed, temp.path().join("test (1).txt"));
    }

    #[test]
    fn test_non_conflicting_no_extension_and_reserved() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("testfile");
        std::fs::write(&path, b"x").unwrap();

        let mut reserved = HashSet::new();
        reserved.insert(temp.path().join("testfile (1)"));

        let renamed = non_conflicting_path(&LocalFs, &path, &reserved);
        assert_eq!(renamed, temp.path().join("testfile (2)"));
    }

    #[test]
    fn test_is_into_itself() {
        assert!(is_into_itself(Path::new("/a/b"), Path::new("/a/b/c/b")));
        assert!(!is_into_itself(Path::new("/a/b"), Path::new("/a/b")));
        assert!(!is_into_itself(Path::new("/a/b"), Path::new("/a/bc")));
    }

    #[test]
    fn test_destination_in() {
        assert_eq!(
            destination_in(Path::new("/target"), Path::new("/src/report.txt")),
            PathBuf::from("/target/report.txt")
        );
    }
}
