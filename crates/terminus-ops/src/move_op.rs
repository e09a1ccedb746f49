//! Move operation with cross-device fallback.

use std::path::Path;

use terminus_core::{is_cross_device, FileSystem};
use tracing::{debug, warn};

use crate::conflict::{ensure_not_into_itself, is_into_itself, remove_existing, staging_path};
use crate::copy::discard_partial;
use crate::{FallbackStage, OperationItem, OpsError};

/// Move a file or directory tree.
///
/// Same collision policy as copy. Tries an in-place rename first and falls
/// back to copy-then-delete only when the filesystem reports a cross-device
/// rename. If the fallback stops after the copy but before the source is
/// gone, the destination is complete and a retry sees
/// [`OpsError::DestinationExists`] unless the caller asks to overwrite.
pub(crate) fn move_entry(fs: &dyn FileSystem, item: &OperationItem) -> Result<(), OpsError> {
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

    if !fs.exists(destination) {
        return relocate(fs, source, destination);
    }
    if !*overwrite {
        return Err(OpsError::DestinationExists {
            path: destination.clone(),
        });
    }
    if source == destination {
        return Ok(());
    }
    if is_into_itself(destination, source) {
        return Err(OpsError::SourceIsAncestor {
            path: source.clone(),
            destination: destination.clone(),
        });
    }

    // Park the existing destination next to itself so a failed move can put
    // it back instead of losing it.
    let aside = staging_path(fs, destination, "replaced");
    fs.rename(destination, &aside)
        .map_err(|e| OpsError::io(destination, e))?;

    let result = relocate(fs, source, destination);
    if result.is_err() && !fs.exists(destination) {
        if let Err(e) = fs.rename(&aside, destination) {
            warn!(path = %aside.display(), error = %e, "failed to restore replaced destination");
        }
    } else {
        discard_partial(fs, &aside);
    }
    result
}

fn relocate(fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<(), OpsError> {
    match fs.rename(source, destination) {
        Ok(()) => {
            debug!(source = %source.display(), destination = %destination.display(), "moved");
            Ok(())
        }
        Err(e) if is_cross_device(&e) => {
            debug!(source = %source.display(), "cross-device rename, falling back to copy + delete");
            copy_then_delete(fs, source, destination)
        }
        Err(e) => Err(OpsError::io(source, e)),
    }
}

fn copy_then_delete(fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<(), OpsError> {
    if let Err(e) = fs.copy_recursive(source, destination) {
        warn!(
            from = %e.from.display(),
            to = %e.to.display(),
            error = %e.cause,
            "cross-device copy failed"
        );
        discard_partial(fs, destination);
        return Err(OpsError::CrossDeviceFallbackFailed {
            path: source.to_path_buf(),
            destination: destination.to_path_buf(),
            stage: FallbackStage::Copy,
            cause: e.cause,
        });
    }

    remove_existing(fs, source).map_err(|cause| {
        warn!(
            source = %source.display(),
            destination = %destination.display(),
            error = %cause,
            "copied across devices but could not remove the source"
        );
        OpsError::CrossDeviceFallbackFailed {
            path: source.to_path_buf(),
            destination: destination.to_path_buf(),
            stage: FallbackStage::RemoveSource,
            cause,
        }
    })?;

    debug!(source = %source.display(), destination = %destination.display(), "moved across devices");
    Ok(())
}
