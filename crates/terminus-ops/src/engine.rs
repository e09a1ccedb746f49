//! The file operation engine.
//!
//! Every call runs its filesystem work on tokio's blocking pool. Batches run
//! their items strictly one after another inside a single blocking task.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use terminus_core::{FileSystem, LocalFs};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clipboard::{ClipboardMode, ClipboardSnapshot, ClipboardState};
use crate::conflict::destination_in;
use crate::paste::{build_paste_items, PastePolicy};
use crate::{
    copy, delete, move_op, rename, BatchResult, DeleteTarget, ItemResult, OperationItem,
    OperationProgress, OperationType, OpsError,
};

/// Runs copy, move, delete and rename against a [`FileSystem`].
#[derive(Debug, Clone)]
pub struct OperationEngine {
    fs: Arc<dyn FileSystem>,
    progress: Option<mpsc::Sender<OperationProgress>>,
}

/// One batch step, identified for reporting.
trait BatchItem: Send + 'static {
    fn source(&self) -> &Path;
    fn destination(&self) -> PathBuf;
}

impl BatchItem for OperationItem {
    fn source(&self) -> &Path {
        &self.source
    }

    fn destination(&self) -> PathBuf {
        self.destination.clone()
    }
}

impl BatchItem for DeleteTarget {
    fn source(&self) -> &Path {
        &self.path
    }

    fn destination(&self) -> PathBuf {
        PathBuf::new()
    }
}

impl OperationEngine {
    /// Create an engine over the given filesystem.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs, progress: None }
    }

    /// Create an engine over the local filesystem.
    pub fn local() -> Self {
        Self::new(Arc::new(LocalFs::new()))
    }

    /// Report batch progress on `tx`. Updates are dropped when the channel
    /// is full; a batch never waits on its observer.
    pub fn with_progress(mut self, tx: mpsc::Sender<OperationProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// The filesystem this engine operates on.
    pub fn filesystem(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Copy a single entry.
    pub async fn copy_entry(&self, item: OperationItem) -> Result<(), OpsError> {
        self.blocking(move |fs| copy::copy_entry(fs, &item)).await?
    }

    /// Move a single entry, falling back to copy + delete across devices.
    pub async fn move_entry(&self, item: OperationItem) -> Result<(), OpsError> {
        self.blocking(move |fs| move_op::move_entry(fs, &item)).await?
    }

    /// Delete a single entry.
    pub async fn delete_entry(&self, path: PathBuf, is_directory: bool) -> Result<(), OpsError> {
        self.blocking(move |fs| delete::delete_entry(fs, &path, is_directory))
            .await?
    }

    /// Rename an entry within its parent and return the new path.
    pub async fn rename_entry(&self, path: PathBuf, new_name: String) -> Result<PathBuf, OpsError> {
        self.blocking(move |fs| rename::rename_entry(fs, &path, &new_name))
            .await?
    }

    /// Copy every item, in order, reporting each outcome.
    pub async fn copy_batch(&self, items: Vec<OperationItem>) -> BatchResult {
        self.run_batch(OperationType::Copy, items, copy::copy_entry)
            .await
    }

    /// Move every item, in order, reporting each outcome.
    pub async fn move_batch(&self, items: Vec<OperationItem>) -> BatchResult {
        self.run_batch(OperationType::Move, items, move_op::move_entry)
            .await
    }

    /// Delete every target, in order, reporting each outcome.
    pub async fn delete_batch(&self, targets: Vec<DeleteTarget>) -> BatchResult {
        self.run_batch(OperationType::Delete, targets, |fs, target| {
            delete::delete_entry(fs, &target.path, target.is_directory)
        })
        .await
    }

    /// Paste the clipboard into `target_dir` and fold the result back into it.
    ///
    /// A copy clipboard is left as it was. A cut clipboard loses the items
    /// that moved and is cleared once all of them have.
    pub async fn paste_items(
        &self,
        clipboard: &mut ClipboardState,
        target_dir: &Path,
        policy: PastePolicy,
    ) -> BatchResult {
        let snapshot = clipboard.snapshot();
        let generation = snapshot.generation;
        let result = self
            .paste_snapshot(snapshot, target_dir.to_path_buf(), policy)
            .await;
        clipboard.settle(generation, &result);
        result
    }

    /// Paste a detached clipboard snapshot. The caller settles the result.
    pub async fn paste_snapshot(
        &self,
        clipboard: ClipboardSnapshot,
        target_dir: PathBuf,
        policy: PastePolicy,
    ) -> BatchResult {
        let operation = match clipboard.mode {
            ClipboardMode::Empty => return BatchResult::new(OperationType::Copy),
            ClipboardMode::Copy => OperationType::Copy,
            ClipboardMode::Cut => OperationType::Move,
        };

        let identities: Vec<(PathBuf, PathBuf)> = clipboard
            .items
            .iter()
            .map(|source| (source.clone(), destination_in(&target_dir, source)))
            .collect();

        // Collision probing for auto-rename touches the filesystem too.
        let planned = self
            .blocking(move |fs| build_paste_items(fs, &clipboard, &target_dir, policy))
            .await;
        let items = match planned {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "failed to plan paste");
                return BatchResult::abandoned(operation, identities, &task_message(e));
            }
        };

        match operation {
            OperationType::Move => self.move_batch(items).await,
            _ => self.copy_batch(items).await,
        }
    }

    async fn run_batch<T: BatchItem>(
        &self,
        operation: OperationType,
        items: Vec<T>,
        step: fn(&dyn FileSystem, &T) -> Result<(), OpsError>,
    ) -> BatchResult {
        let identities: Vec<(PathBuf, PathBuf)> = items
            .iter()
            .map(|item| (item.source().to_path_buf(), item.destination()))
            .collect();
        let progress_tx = self.progress.clone();

        let joined = self
            .blocking(move |fs| {
                let mut result = BatchResult::new(operation);
                let mut progress = OperationProgress::new(operation, items.len());

                for item in &items {
                    progress.set_current(item.source());
                    report(&progress_tx, &progress);

                    let outcome = step(fs, item);
                    match &outcome {
                        Ok(()) => debug!(%operation, source = %item.source().display(), "item done"),
                        Err(e) => warn!(%operation, source = %item.source().display(), error = %e, "item failed"),
                    }
                    progress.complete_item(outcome.is_ok());
                    result.push(ItemResult::new(
                        item.source().to_path_buf(),
                        item.destination(),
                        outcome.err(),
                    ));
                }

                progress.current = None;
                report(&progress_tx, &progress);
                result
            })
            .await;

        let result = joined
            .unwrap_or_else(|e| BatchResult::abandoned(operation, identities, &task_message(e)));

        info!(%operation, total = result.len(), failed = result.failed_count(), "batch finished");
        result
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, OpsError>
    where
        F: FnOnce(&dyn FileSystem) -> T + Send + 'static,
        T: Send + 'static,
    {
        let fs = Arc::clone(&self.fs);
        tokio::task::spawn_blocking(move || f(fs.as_ref()))
            .await
            .map_err(|e| OpsError::Task {
                message: e.to_string(),
            })
    }
}

impl Default for OperationEngine {
    fn default() -> Self {
        Self::local()
    }
}

fn task_message(err: OpsError) -> String {
    match err {
        OpsError::Task { message } => message,
        other => other.to_string(),
    }
}

fn report(tx: &Option<mpsc::Sender<OperationProgress>>, progress: &OperationProgress) {
    if let Some(tx) = tx {
        let _ = tx.try_send(progress.clone());
    }
}
