//! Error types for the runner.

use gravity_agent::SyncError;
use thiserror::Error;

/// Errors that end a runner command.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// I/O error on a file or socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Output could not be serialized.
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// The sync session reported an error.
    #[error("sync failed: {0}")]
    Sync(#[from] SyncError),

    /// No data arrived within the read timeout.
    #[error("timed out after {0} ms waiting for the device")]
    Timeout(u64),

    /// The bridge closed the connection mid-sync.
    #[error("device disconnected before the sync completed")]
    Disconnected,

    /// The firmware kept rejecting the request.
    #[error("firmware rejected sync {attempts} times")]
    RetriesExhausted {
        /// Requests written.
        attempts: u32,
    },

    /// A replayed capture ended before the prompt.
    #[error("capture ended before the sync response completed")]
    Incomplete,
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
