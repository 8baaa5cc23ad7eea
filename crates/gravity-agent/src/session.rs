//! Sync session state machine.
//!
//! ```text
//! Idle -> Requesting -> Accumulating -> Dispatching -> Idle
//!              ^              |
//!              +-- RetryRequested (Unrecognized command)
//!                             |
//!                           Failed (retry limit reached)
//! ```
//!
//! Only one sync can be in flight: the receiver slot is claimed in
//! `Requesting` and released after `Dispatching`, and a new request is refused
//! while it is held.

use gravity_metrics::{metric_defs, SessionLabels};
use gravity_protocol::{AccumResult, ResponseAccumulator, SYNC_REQUEST};
use tracing::{debug, info, trace, warn};

use crate::config::SessionConfig;
use crate::dispatch::{DispatchSummary, SyncDispatcher};
use crate::error::{SyncError, SyncResult};
use crate::settings::SettingsModel;
use crate::transport::UartTransport;

/// State of a sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No sync in flight.
    Idle,
    /// Writing the request.
    Requesting,
    /// Collecting the response.
    Accumulating,
    /// Applying the response to the model.
    Dispatching,
    /// The firmware rejected the request; about to ask again.
    RetryRequested,
    /// Gave up after the retry limit.
    Failed,
}

/// What happened to a received chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncProgress {
    /// No sync was waiting for data.
    Ignored,
    /// Still waiting for the prompt.
    Pending,
    /// Part of the chunk did not fit; `dropped` bytes lost so far.
    Overflow {
        /// Bytes dropped for the current response.
        dropped: usize,
    },
    /// The request was re-issued.
    Retrying {
        /// Retry number, starting at 1.
        attempt: u32,
    },
    /// The response was applied and the session is idle again.
    Completed(DispatchSummary),
    /// The retry limit was reached.
    Failed {
        /// Requests written, including the first.
        attempts: u32,
    },
}

/// Drives one UART link and owns the settings it mirrors.
pub struct SyncSession<T: UartTransport> {
    transport: T,
    config: SessionConfig,
    accumulator: ResponseAccumulator,
    dispatcher: SyncDispatcher,
    settings: SettingsModel,
    state: SessionState,
    receiver_attached: bool,
    retries: u32,
    labels: SessionLabels,
}

impl<T: UartTransport> SyncSession<T> {
    /// Create a session with default settings.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self::with_labels(transport, config, SessionLabels::default())
    }

    /// Create a session recording metrics under `labels`.
    pub fn with_labels(transport: T, config: SessionConfig, labels: SessionLabels) -> Self {
        SyncSession {
            transport,
            accumulator: ResponseAccumulator::with_capacity(config.buffer_capacity),
            dispatcher: SyncDispatcher::new(labels.clone()),
            config,
            settings: SettingsModel::new(),
            state: SessionState::Idle,
            receiver_attached: false,
            retries: 0,
            labels,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a sync is in flight.
    pub fn is_busy(&self) -> bool {
        !matches!(self.state, SessionState::Idle | SessionState::Failed)
    }

    /// The mirrored settings.
    pub fn settings(&self) -> &SettingsModel {
        &self.settings
    }

    /// Get the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Retries made by the current or last sync.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Start a sync.
    ///
    /// Refused with [`SyncError::SyncInProgress`] unless the session is idle
    /// (or failed, which counts as idle for a fresh attempt).
    pub fn start_sync(&mut self) -> SyncResult<()> {
        if self.is_busy() {
            return Err(SyncError::SyncInProgress(self.state));
        }

        info!("starting sync");
        self.retries = 0;
        self.accumulator.clear();
        self.request()
    }

    /// Feed a chunk received from the UART.
    pub fn on_receive(&mut self, chunk: &[u8]) -> SyncResult<SyncProgress> {
        if self.state != SessionState::Accumulating {
            trace!("ignoring {} bytes in state {:?}", chunk.len(), self.state);
            return Ok(SyncProgress::Ignored);
        }

        let dropped_before = self.accumulator.dropped();
        let result = self.accumulator.append(chunk);
        let newly_dropped = self.accumulator.dropped() - dropped_before;
        if newly_dropped > 0 {
            metric_defs::BYTES_DROPPED
                .counter(&self.labels)
                .increment(newly_dropped as u64);
        }

        match result {
            AccumResult::Pending => Ok(SyncProgress::Pending),
            AccumResult::Overflow => Ok(SyncProgress::Overflow {
                dropped: self.accumulator.dropped(),
            }),
            AccumResult::ErrorDetected => self.retry(),
            AccumResult::Complete => self.dispatch(),
        }
    }

    /// Abandon any sync in flight and drop every synced label.
    pub fn cleanup(&mut self) {
        self.release_receiver();
        self.accumulator.clear();
        self.settings.release_labels();
        self.record_labels();
        self.state = SessionState::Idle;
        debug!("sync session cleaned up");
    }

    fn request(&mut self) -> SyncResult<()> {
        self.state = SessionState::Requesting;

        if !self.receiver_attached {
            self.transport.attach_receiver();
            self.receiver_attached = true;
        }

        if let Err(e) = self.transport.transmit(SYNC_REQUEST) {
            warn!("failed to send sync request: {}", e);
            self.release_receiver();
            self.state = SessionState::Idle;
            return Err(e.into());
        }

        metric_defs::SYNC_ATTEMPTS.counter(&self.labels).increment(1);
        self.state = SessionState::Accumulating;
        Ok(())
    }

    fn retry(&mut self) -> SyncResult<SyncProgress> {
        self.accumulator.clear();
        self.state = SessionState::RetryRequested;

        if !self.config.allows_retry(self.retries) {
            let attempts = self.retries + 1;
            warn!("firmware kept rejecting sync, giving up after {} attempts", attempts);
            self.release_receiver();
            self.state = SessionState::Failed;
            metric_defs::SYNC_FAILED.counter(&self.labels).increment(1);
            return Ok(SyncProgress::Failed { attempts });
        }

        self.retries += 1;
        debug!("unrecognized command, re-sending sync (retry {})", self.retries);
        metric_defs::SYNC_RETRIES.counter(&self.labels).increment(1);
        self.request()?;
        Ok(SyncProgress::Retrying {
            attempt: self.retries,
        })
    }

    fn dispatch(&mut self) -> SyncResult<SyncProgress> {
        self.state = SessionState::Dispatching;

        let response = self.accumulator.take();
        metric_defs::RESPONSE_SIZE
            .histogram(&self.labels)
            .record(response.len() as f64);

        let result = self.dispatcher.process(&response, &mut self.settings);
        self.record_labels();

        self.release_receiver();
        self.state = SessionState::Idle;

        let summary = result?;
        info!(
            "sync complete: {} applied, {} unknown, {} malformed, {} rejected",
            summary.applied, summary.unknown_tags, summary.malformed, summary.rejected
        );
        metric_defs::SYNC_COMPLETED.counter(&self.labels).increment(1);
        Ok(SyncProgress::Completed(summary))
    }

    fn record_labels(&self) {
        metric_defs::LABELS_OVERRIDDEN
            .gauge(&self.labels)
            .set(self.settings.overridden_labels() as f64);
    }

    fn release_receiver(&mut self) {
        if self.receiver_attached {
            self.transport.detach_receiver();
            self.receiver_attached = false;
        }
    }
}

impl<T: UartTransport> Drop for SyncSession<T> {
    fn drop(&mut self) {
        self.release_receiver();
    }
}
