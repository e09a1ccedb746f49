//! Fire-and-observe executor for mutation jobs.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::warn;

use crate::clipboard::{ClipboardMode, ClipboardSnapshot};
use crate::conflict::destination_in;
use crate::{
    BatchResult, DeleteTarget, OperationEngine, OperationProgress, OperationType, OpsError,
    PastePolicy, OPERATION_CHANNEL_SIZE,
};

/// Identifies one spawned job among those running concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

/// A mutation to run in the background.
#[derive(Debug, Clone)]
pub enum Job {
    /// Paste a clipboard snapshot into a directory.
    Paste {
        clipboard: ClipboardSnapshot,
        target: PathBuf,
        policy: PastePolicy,
    },
    /// Delete targets in order.
    Delete { targets: Vec<DeleteTarget> },
    /// Rename one entry within its parent.
    Rename { path: PathBuf, new_name: String },
}

/// The result of a finished job.
#[derive(Debug)]
pub enum JobOutcome {
    /// A paste finished. `generation` and `mode` identify the clipboard it
    /// was started from.
    Pasted {
        generation: u64,
        mode: ClipboardMode,
        target: PathBuf,
        result: BatchResult,
    },
    /// A delete batch finished.
    Deleted { result: BatchResult },
    /// A rename finished.
    Renamed {
        from: PathBuf,
        result: Result<PathBuf, OpsError>,
    },
}

impl JobOutcome {
    /// The outcome of a job whose task died before reporting: every item
    /// it was given counts as failed.
    pub fn abandoned(job: Job, message: &str) -> Self {
        match job {
            Job::Paste {
                clipboard,
                target,
                ..
            } => {
                let operation = match clipboard.mode {
                    ClipboardMode::Cut => OperationType::Move,
                    ClipboardMode::Copy | ClipboardMode::Empty => OperationType::Copy,
                };
                let items = clipboard
                    .items
                    .iter()
                    .map(|source| (source.clone(), destination_in(&target, source)))
                    .collect::<Vec<_>>();
                Self::Pasted {
                    generation: clipboard.generation,
                    mode: clipboard.mode,
                    result: BatchResult::abandoned(operation, items, message),
                    target,
                }
            }
            Job::Delete { targets } => Self::Deleted {
                result: BatchResult::abandoned(
                    OperationType::Delete,
                    targets.into_iter().map(|t| (t.path, PathBuf::new())),
                    message,
                ),
            },
            Job::Rename { path, .. } => Self::Renamed {
                from: path,
                result: Err(OpsError::Task {
                    message: message.to_string(),
                }),
            },
        }
    }
}

/// Events emitted while a job runs. `Finished` is always last, even when
/// the job's task dies.
#[derive(Debug)]
pub enum OperationEvent {
    Progress {
        job: JobId,
        progress: OperationProgress,
    },
    Finished {
        job: JobId,
        outcome: JobOutcome,
    },
}

/// Runs jobs on the tokio runtime and streams their events.
#[derive(Debug, Clone, Default)]
pub struct OperationExecutor {
    engine: OperationEngine,
    next_id: Arc<AtomicU64>,
}

impl OperationExecutor {
    /// Create an executor around an engine.
    pub fn new(engine: OperationEngine) -> Self {
        Self {
            engine,
            next_id: Arc::default(),
        }
    }

    /// Start a job and return the receiver for its events.
    ///
    /// The job keeps running if the receiver is dropped.
    pub fn spawn(&self, job: Job) -> mpsc::Receiver<OperationEvent> {
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (progress_tx, progress_rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
        let engine = self.engine.clone().with_progress(progress_tx);

        let fallback = job.clone();
        let handle = tokio::spawn(run_job(engine, job));
        Self::adapt_results(id, progress_rx, handle, fallback)
    }

    /// Forward progress until the job drops its sender, then emit the outcome.
    fn adapt_results(
        job: JobId,
        mut progress_rx: mpsc::Receiver<OperationProgress>,
        handle: tokio::task::JoinHandle<JobOutcome>,
        fallback: Job,
    ) -> mpsc::Receiver<OperationEvent> {
        let (tx, result_rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);

        tokio::spawn(async move {
            let mut observed = true;
            while let Some(progress) = progress_rx.recv().await {
                if observed
                    && tx
                        .send(OperationEvent::Progress { job, progress })
                        .await
                        .is_err()
                {
                    observed = false;
                }
            }

            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(job = job.0, error = %e, "operation task failed");
                    JobOutcome::abandoned(fallback, &e.to_string())
                }
            };
            if observed {
                let _ = tx.send(OperationEvent::Finished { job, outcome }).await;
            }
        });

        result_rx
    }
}

async fn run_job(engine: OperationEngine, job: Job) -> JobOutcome {
    match job {
        Job::Paste {
            clipboard,
            target,
            policy,
        } => {
            let generation = clipboard.generation;
            let mode = clipboard.mode;
            let result = engine
                .paste_snapshot(clipboard, target.clone(), policy)
                .await;
            JobOutcome::Pasted {
                generation,
                mode,
                target,
                result,
            }
        }
        Job::Delete { targets } => JobOutcome::Deleted {
            result: engine.delete_batch(targets).await,
        },
        Job::Rename { path, new_name } => {
            let result = engine.rename_entry(path.clone(), new_name).await;
            JobOutcome::Renamed { from: path, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClipboardState;

    #[test]
    fn test_abandoned_cut_fails_every_item() {
        let mut clipboard = ClipboardState::new();
        clipboard.cut([PathBuf::from("/src/a.txt"), PathBuf::from("/src/b.txt")]);
        let job = Job::Paste {
            clipboard: clipboard.snapshot(),
            target: PathBuf::from("/dst"),
            policy: PastePolicy::Fail,
        };

        let JobOutcome::Pasted {
            generation, result, ..
        } = JobOutcome::abandoned(job, "cancelled")
        else {
            panic!("expected a paste outcome");
        };

        assert_eq!(result.operation, OperationType::Move);
        assert_eq!(result.failed_count(), 2);
        assert_eq!(result.per_item[1].destination, PathBuf::from("/dst/b.txt"));

        // Settling a dead cut keeps everything pending.
        clipboard.settle(generation, &result);
        assert_eq!(clipboard.len(), 2);
        assert_eq!(clipboard.mode(), ClipboardMode::Cut);
    }

    #[test]
    fn test_abandoned_rename_is_an_error() {
        let outcome = JobOutcome::abandoned(
            Job::Rename {
                path: PathBuf::from("/src/a.txt"),
                new_name: "b.txt".into(),
            },
            "cancelled",
        );
        assert!(matches!(
            outcome,
            JobOutcome::Renamed {
                result: Err(OpsError::Task { .. }),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_concurrent_jobs_get_distinct_ids() {
        let executor = OperationExecutor::default();
        let mut first = executor.spawn(Job::Delete { targets: vec![] });
        let mut second = executor.spawn(Job::Delete { targets: vec![] });

        let last_id = |events: Vec<OperationEvent>| match events.last() {
            Some(OperationEvent::Finished { job, .. }) => *job,
            other => panic!("unexpected final event: {other:?}"),
        };
        let mut a = Vec::new();
        while let Some(event) = first.recv().await {
            a.push(event);
        }
        let mut b = Vec::new();
        while let Some(event) = second.recv().await {
            b.push(event);
        }

        assert_ne!(last_id(a), last_id(b));
    }
}
