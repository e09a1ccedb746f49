//! File operations engine for terminus.
//!
//! Single-item copy, move, delete and rename against a [`FileSystem`],
//! composed into ordered best-effort batches with per-item reporting, plus
//! the pending clipboard that paste consumes.
//!
//! Batch items always run one after another: a later item's collision check
//! observes everything earlier items did. Only the executor is concurrent
//! with the caller, never with itself within a batch.
//!
//! [`FileSystem`]: terminus_core::FileSystem

mod clipboard;
mod conflict;
mod copy;
mod delete;
mod engine;
mod error;
mod executor;
mod move_op;
mod operation;
mod paste;
mod progress;
mod rename;

pub use clipboard::{ClipboardMode, ClipboardSnapshot, ClipboardState};
pub use conflict::{destination_in, is_into_itself, non_conflicting_path};
pub use engine::OperationEngine;
pub use error::{DeleteReason, FallbackStage, OpsError};
pub use executor::{Job, JobId, JobOutcome, OperationEvent, OperationExecutor};
pub use operation::{BatchResult, DeleteTarget, ItemResult, OperationItem, OperationType};
pub use paste::{build_paste_items, PastePolicy};
pub use progress::OperationProgress;
pub use rename::validate_filename;

/// Default channel buffer size for operation progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
