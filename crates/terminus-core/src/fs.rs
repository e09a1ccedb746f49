//! The filesystem collaborator.
//!
//! Everything that touches the disk goes through [`FileSystem`], so the
//! operation engine and the listing can be exercised against fault-injecting
//! implementations in tests. [`LocalFs`] is the real thing.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::CopyError;

/// Raw directory item, as returned by a typed directory read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_file: bool,
}

/// Metadata for a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub created: Option<SystemTime>,
    pub is_dir: bool,
    pub is_file: bool,
    /// The path itself is a symbolic link (the other fields describe its target).
    pub is_symlink: bool,
    /// Raw mode bits (unix only).
    pub mode: Option<u32>,
}

/// Filesystem primitives consumed by the operation engine and the listing.
///
/// All methods are blocking; async callers run them inside
/// `tokio::task::spawn_blocking`.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// List a directory with entry types.
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirItem>>;

    /// Stat a path, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<Stat>;

    /// Read at most `limit` bytes from the start of a file.
    fn read_bytes(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>>;

    /// Copy a single file, returning the number of bytes written.
    fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<u64>;

    /// Rename. Fails with a cross-device error (see [`is_cross_device`])
    /// when source and destination live on different filesystems.
    fn rename(&self, source: &Path, destination: &Path) -> io::Result<()>;

    /// Remove a directory tree. A missing path is not an error.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a single file or symlink.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// The target of `path` when `path` is itself a symbolic link.
    fn symlink_target(&self, path: &Path) -> io::Result<Option<PathBuf>>;

    /// Create a symbolic link at `link` pointing to `target`, verbatim.
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Check whether anything (including a dangling symlink) occupies `path`.
    fn exists(&self, path: &Path) -> bool;

    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// Recursively copy a file or directory tree, preserving structure.
    /// Symbolic links are recreated as links, never followed.
    /// Returns the number of bytes copied.
    fn copy_recursive(&self, source: &Path, destination: &Path) -> Result<u64, CopyError> {
        let fail = |cause| CopyError::new(source, destination, cause);

        if let Some(target) = self.symlink_target(source).map_err(fail)? {
            self.symlink(&target, destination).map_err(fail)?;
            return Ok(0);
        }

        let stat = self.stat(source).map_err(fail)?;
        if !stat.is_dir {
            return self.copy_file(source, destination).map_err(fail);
        }

        self.create_dir_all(destination).map_err(fail)?;
        let mut total_bytes = 0u64;
        for item in self.read_dir(source).map_err(fail)? {
            let Some(name) = item.path.file_name() else {
                continue;
            };
            total_bytes += self.copy_recursive(&item.path, &destination.join(name))?;
        }
        Ok(total_bytes)
    }
}

/// Check whether an error is the "rename across devices" condition.
pub fn is_cross_device(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::CrossesDevices {
        return true;
    }
    // EXDEV has the same value on Linux and the BSDs.
    #[cfg(unix)]
    if err.raw_os_error() == Some(18) {
        return true;
    }
    false
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new local filesystem handle.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFs {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirItem>> {
        let mut items = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // file_type() does not follow symlinks; resolve them so a link to a
            // directory behaves like one.
            let (is_dir, is_file) = match entry.file_type() {
                Ok(ft) if ft.is_symlink() => match fs::metadata(entry.path()) {
                    Ok(meta) => (meta.is_dir(), meta.is_file()),
                    Err(_) => (false, false),
                },
                Ok(ft) => (ft.is_dir(), ft.is_file()),
                Err(_) => (false, false),
            };
            items.push(DirItem {
                path: entry.path(),
                is_dir,
                is_file,
            });
        }
        Ok(items)
    }

    fn stat(&self, path: &Path) -> io::Result<Stat> {
        let is_symlink = fs::symlink_metadata(path)?.file_type().is_symlink();
        let metadata = fs::metadata(path)?;

        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            Some(metadata.permissions().mode())
        };
        #[cfg(not(unix))]
        let mode = None;

        Ok(Stat {
            size: metadata.len(),
            modified: metadata.modified().ok(),
            created: metadata.created().ok(),
            is_dir: metadata.is_dir(),
            is_file: metadata.is_file(),
            is_symlink,
            mode,
        })
    }

    fn read_bytes(&self, path: &Path, limit: usize) -> io::Result<Vec<u8>> {
        let file = fs::File::open(path)?;
        let mut buf = Vec::with_capacity(limit.min(64 * 1024));
        file.take(limit as u64).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<u64> {
        fs::copy(source, destination)
    }

    fn rename(&self, source: &Path, destination: &Path) -> io::Result<()> {
        fs::rename(source, destination)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        match fs::remove_dir_all(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn symlink_target(&self, path: &Path) -> io::Result<Option<PathBuf>> {
        if fs::symlink_metadata(path)?.file_type().is_symlink() {
            fs::read_link(path).map(Some)
        } else {
            Ok(None)
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        create_symlink(target, link)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    // Windows needs to know the kind up front; relative targets resolve
    // against the link's directory.
    let resolved = match link.parent() {
        Some(parent) => parent.join(target),
        None => target.to_path_buf(),
    };
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}
