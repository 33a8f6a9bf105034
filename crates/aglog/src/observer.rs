//! Rotation diagnostics.
//!
//! Rotation is best effort: a failed move never fails the write that
//! triggered it. The outcome is reported through a [`RolloverObserver`]
//! instead, which defaults to [`TracingObserver`].

use std::io;
use std::path::Path;

use tracing::{info, warn};

/// Receives the outcome of each rotation attempt.
pub trait RolloverObserver: Send + Sync {
    /// Called after the active file was moved to `to`.
    fn rotated(&self, from: &Path, to: &Path) {
        let _ = (from, to);
    }

    /// Called when moving the active file failed; the move is retried on
    /// the next write.
    fn rotation_failed(&self, from: &Path, to: &Path, error: &io::Error);
}

/// Reports rotations as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RolloverObserver for TracingObserver {
    fn rotated(&self, from: &Path, to: &Path) {
        info!(from = %from.display(), to = %to.display(), "rotated log file");
    }

    fn rotation_failed(&self, from: &Path, to: &Path, error: &io::Error) {
        warn!(
            from = %from.display(),
            to = %to.display(),
            error = %error,
            "log rotation failed, will retry on next write"
        );
    }
}
