//! Error types for sync sessions.

use thiserror::Error;

use crate::session::SessionState;
use crate::transport::TransportError;

/// Errors surfaced by a sync session.
///
/// None of these are fatal to the host; at worst the settings mirror stays
/// stale or partially updated.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A sync is already running.
    #[error("sync already in progress (state {0:?})")]
    SyncInProgress(SessionState),

    /// The completed response held no `(tag:value)` group at all.
    #[error("sync response contained no settings")]
    EmptyResponse,

    /// The UART could not carry the request.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
