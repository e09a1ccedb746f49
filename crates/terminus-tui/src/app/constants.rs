//! Application constants.

/// Channel buffer size for results delivered to the event loop.
pub const EVENT_CHANNEL_SIZE: usize = 100;

/// Event loop tick interval in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 50;

/// Bytes read from a file for the preview pane.
pub const PREVIEW_BYTES: usize = 8 * 1024;
