//! Background work started by the event loop.
//!
//! Every task reports back through one channel of [`AppEvent`]s, so the
//! mode machine only ever changes inside the loop.

use std::path::PathBuf;
use std::sync::Arc;

use terminus_core::{FileSystem, ListingConfig};
use terminus_modal::ModalEvent;
use terminus_ops::{Job, OperationEvent, OperationExecutor};
use terminus_scan::{list_directory, start_search, SearchConfig, SearchEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::constants::PREVIEW_BYTES;

/// Results delivered to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Fed to [`ModalState::apply`](terminus_modal::ModalState::apply).
    Modal(ModalEvent),
    /// Contents for the preview pane.
    Preview {
        path: PathBuf,
        text: Result<String, String>,
    },
}

/// How a listing result should be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// A navigation; the result lands in NORMAL.
    Navigate,
    /// A re-read of the current directory after a mutation.
    Refresh,
}

/// List `dir` and send the result.
pub fn spawn_listing(
    tx: mpsc::Sender<AppEvent>,
    fs: Arc<dyn FileSystem>,
    config: ListingConfig,
    dir: PathBuf,
    focus: Option<PathBuf>,
    kind: ListingKind,
) {
    tokio::spawn(async move {
        let event = match list_directory(fs, dir.clone(), config).await {
            Ok(entries) => match kind {
                ListingKind::Navigate => ModalEvent::Listed {
                    dir,
                    entries,
                    focus,
                },
                ListingKind::Refresh => ModalEvent::Refreshed { dir, entries },
            },
            Err(e) => ModalEvent::ListingFailed {
                dir,
                message: e.to_string(),
            },
        };
        let _ = tx.send(AppEvent::Modal(event)).await;
    });
}

/// Run a search and forward its events tagged with `generation`.
///
/// Aborting the returned task drops the search receiver, which stops the
/// walk.
pub fn spawn_search(
    tx: mpsc::Sender<AppEvent>,
    root: PathBuf,
    query: String,
    generation: u64,
    config: SearchConfig,
) -> JoinHandle<()> {
    let mut rx = start_search(root, query, config);

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let event = match event {
                SearchEvent::Matches(matches) => ModalEvent::SearchMatches {
                    generation,
                    matches,
                },
                SearchEvent::Complete { total, truncated } => ModalEvent::SearchFinished {
                    generation,
                    total,
                    truncated,
                },
                SearchEvent::Failed { message } => ModalEvent::SearchFailed {
                    generation,
                    message,
                },
            };
            if tx.send(AppEvent::Modal(event)).await.is_err() {
                break;
            }
        }
        debug!(generation, "search forwarder finished");
    })
}

/// Start a mutation job and forward its progress and outcome.
pub fn spawn_job(tx: mpsc::Sender<AppEvent>, executor: &OperationExecutor, job: Job) {
    let mut rx = executor.spawn(job);

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let event = match event {
                OperationEvent::Progress { job, progress } => ModalEvent::Progress { job, progress },
                OperationEvent::Finished { job, outcome } => ModalEvent::Operation { job, outcome },
            };
            if tx.send(AppEvent::Modal(event)).await.is_err() {
                break;
            }
        }
    });
}

/// Read the head of a file for the preview pane.
pub fn spawn_preview(tx: mpsc::Sender<AppEvent>, fs: Arc<dyn FileSystem>, path: PathBuf) {
    tokio::spawn(async move {
        let read_path = path.clone();
        let text = tokio::task::spawn_blocking(move || fs.read_bytes(&read_path, PREVIEW_BYTES))
            .await
            .map_err(|e| e.to_string())
            .and_then(|read| read.map_err(|e| e.to_string()))
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
        let _ = tx.send(AppEvent::Preview { path, text }).await;
    });
}
