//! Copy operation.

use std::path::Path;

use terminus_core::{CopyError, FileSystem};
use tracing::{debug, warn};

use crate::conflict::{ensure_not_into_itself, is_into_itself, remove_existing, staging_path};
use crate::{OperationItem, OpsError};

/// Copy a file or directory tree.
///
/// Fails with [`OpsError::DestinationExists`] when the destination is
/// occupied and `overwrite` is false; nothing is touched in that case.
/// With `overwrite`, the new tree is first copied to a hidden sibling and
/// only then swapped in, so a failure or crash mid-way never leaves a
/// half-copied destination that looks complete.
pub(crate) fn copy_entry(fs: &dyn FileSystem, item: &OperationItem) -> Result<(), OpsError> {
    let OperationItem {
        source,
        destination,
        overwrite,
    } = item;

    if !fs.exists(source) {
        return Err(OpsError::SourceMissing {
            path: source.clone(),
        });
    }
    ensure_not_into_itself(source, destination)?;

    if fs.exists(destination) {
        if !*overwrite {
            return Err(OpsError::DestinationExists {
                path: destination.clone(),
            });
        }
        // Replacing an ancestor of the source would delete the source.
        if is_into_itself(destination, source) {
            return Err(OpsError::SourceIsAncestor {
                path: source.clone(),
                destination: destination.clone(),
            });
        }
        return replace_with_copy(fs, source, destination);
    }

    let bytes = fs.copy_recursive(source, destination).map_err(|e| {
        discard_partial(fs, destination);
        OpsError::copy(e)
    })?;
    debug!(source = %source.display(), destination = %destination.display(), bytes, "copied");
    Ok(())
}

fn replace_with_copy(fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<(), OpsError> {
    let staged = staging_path(fs, destination, "partial");

    if let Err(e) = fs.copy_recursive(source, &staged) {
        discard_partial(fs, &staged);
        return Err(OpsError::copy(unstage(e, &staged, destination)));
    }
    if let Err(e) = remove_existing(fs, destination) {
        discard_partial(fs, &staged);
        return Err(OpsError::io(destination, e));
    }
    fs.rename(&staged, destination)
        .map_err(|e| OpsError::io(destination, e))?;

    debug!(source = %source.display(), destination = %destination.display(), "copied over existing");
    Ok(())
}

/// Report a failure inside the staging tree against the real destination.
fn unstage(mut err: CopyError, staged: &Path, destination: &Path) -> CopyError {
    if let Ok(rest) = err.to.strip_prefix(staged) {
        err.to = if rest.as_os_str().is_empty() {
            destination.to_path_buf()
        } else {
            destination.join(rest)
        };
    }
    err
}

/// Best-effort removal of a partial copy we created ourselves.
pub(crate) fn discard_partial(fs: &dyn FileSystem, path: &Path) {
    if !fs.exists(path) {
        return;
    }
    if let Err(e) = remove_existing(fs, path) {
        warn!(path = %path.display(), error = %e, "failed to remove partial copy");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unstage_maps_into_destination() {
        let staged = Path::new("/dst/.project.terminus-partial");
        let destination = Path::new("/dst/project");

        let err = CopyError::new(
            Path::new("/src/project/b.txt"),
            &staged.join("b.txt"),
            io::Error::from(io::ErrorKind::StorageFull),
        );
        assert_eq!(unstage(err, staged, destination).to, destination.join("b.txt"));

        let err = CopyError::new(
            Path::new("/src/project"),
            staged,
            io::Error::from(io::ErrorKind::StorageFull),
        );
        assert_eq!(unstage(err, staged, destination).to, destination);
    }
}
