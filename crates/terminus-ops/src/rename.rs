//! Rename operation.

use std::path::{Path, PathBuf};

use terminus_core::FileSystem;
use tracing::debug;

use crate::OpsError;

/// Rename a file or directory within its parent.
///
/// Computes `dirname(old_path)/new_name`. Never overwrites: an occupied
/// sibling fails with [`OpsError::NameCollision`] and nothing changes.
/// Renaming to the current name is a no-op.
pub(crate) fn rename_entry(
    fs: &dyn FileSystem,
    old_path: &Path,
    new_name: &str,
) -> Result<PathBuf, OpsError> {
    validate_filename(new_name).map_err(|reason| OpsError::InvalidName {
        name: new_name.to_string(),
        reason,
    })?;

    let parent = old_path.parent().unwrap_or(Path::new(""));
    let new_path = parent.join(new_name);

    if new_path == old_path {
        return Ok(new_path);
    }
    if !fs.exists(old_path) {
        return Err(OpsError::SourceMissing {
            path: old_path.to_path_buf(),
        });
    }
    if fs.exists(&new_path) {
        return Err(OpsError::NameCollision {
            path: new_path,
            name: new_name.to_string(),
        });
    }

    fs.rename(old_path, &new_path)
        .map_err(|e| OpsError::io(old_path, e))?;

    debug!(from = %old_path.display(), to = %new_path.display(), "renamed");
    Ok(new_path)
}

/// Validate a filename for cross-platform compatibility.
pub fn validate_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".into());
    }

    if name.len() > 255 {
        return Err("Name is too long (max 255 characters)".into());
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return Err(format!("Name cannot contain '{}'", c.escape_default()));
        }
    }

    #[cfg(target_os = "windows")]
    {
        let windows_invalid = ['\\', ':', '*', '?', '"', '<', '>', '|'];
        for c in windows_invalid {
            if name.contains(c) {
                return Err(format!("Name cannot contain '{}'", c));
            }
        }

        let reserved = [
            "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
            "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
        ];
        let upper_name = name.to_uppercase();
        let base_name = upper_name.split('.').next().unwrap_or("");
        if reserved.contains(&base_name) {
            return Err("Reserved filename".into());
        }
    }

    if name == "." || name == ".." {
        return Err("'.' and '..' are reserved names".into());
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return Err("Name cannot start or end with spaces".into());
    }

    if name.ends_with('.') {
        return Err("Name cannot end with a dot".into());
    }

    Ok(())
}
