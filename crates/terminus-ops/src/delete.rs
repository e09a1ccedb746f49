//! Delete operation.

use std::path::Path;

use terminus_core::FileSystem;
use tracing::debug;

use crate::OpsError;

/// Delete a path. Directories are removed recursively and forcibly (a
/// missing directory is not an error); files are unlinked.
pub(crate) fn delete_entry(
    fs: &dyn FileSystem,
    path: &Path,
    is_directory: bool,
) -> Result<(), OpsError> {
    let result = if is_directory {
        fs.remove_dir_all(path)
    } else {
        fs.remove_file(path)
    };
    result.map_err(|e| OpsError::delete(path, e))?;

    debug!(path = %path.display(), is_directory, "deleted");
    Ok(())
}
