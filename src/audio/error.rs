use std::path::PathBuf;

use thiserror::Error;

use super::backend::BindStrategy;

/// Failures of the decode/output layer.
///
/// The session never hands these to its callers; they are logged where they
/// happen and the session falls back to `Idle` or `Loaded`.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("file does not exist: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("cannot decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("{strategy} binding failed: {reason}")]
    Bind {
        strategy: BindStrategy,
        reason: String,
    },

    #[error("no output for {} after {attempts} binding attempts (last error: {last})", .path.display())]
    BindExhausted {
        path: PathBuf,
        attempts: usize,
        last: String,
    },

    #[error("audio device error: {0}")]
    Device(String),

    #[error("failed to release output: {0}")]
    Release(String),
}
