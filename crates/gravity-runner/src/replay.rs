//! Offline replay of captured UART output.

use std::path::Path;

use gravity_agent::{MockTransport, SessionConfig, SyncProgress, SyncSession};
use gravity_metrics::SessionLabels;
use gravity_protocol::COMPLETION_MARKER;
use tracing::{debug, info};

use crate::error::{RunnerError, RunnerResult};
use crate::output::SyncReport;

/// Transport label used in metrics.
pub const TRANSPORT_LABEL: &str = "replay";

/// Feed `data` to a fresh session in `chunk_size` pieces.
///
/// A capture may contain rejected attempts before the real response. Chunks
/// never span a prompt, matching a device that stays quiet until the next
/// request, so the bytes after a rejection reach the retried session.
pub fn replay_bytes(
    name: &str,
    data: &[u8],
    chunk_size: usize,
    config: &SessionConfig,
) -> RunnerResult<SyncReport> {
    let labels = SessionLabels::new(name, TRANSPORT_LABEL);
    let mut session = SyncSession::with_labels(MockTransport::new(), config.clone(), labels);
    session.start_sync()?;

    let chunks = data
        .split_inclusive(|&b| b == COMPLETION_MARKER)
        .flat_map(|segment| segment.chunks(chunk_size.max(1)));

    for chunk in chunks {
        match session.on_receive(chunk)? {
            SyncProgress::Completed(summary) => {
                info!(applied = summary.applied, "replay complete");
                return Ok(SyncReport {
                    device: name.to_string(),
                    source: "replay".to_string(),
                    attempts: session.transport().sent_messages().len() as u32,
                    summary,
                    settings: session.settings().clone(),
                });
            }
            SyncProgress::Failed { attempts } => {
                return Err(RunnerError::RetriesExhausted { attempts });
            }
            SyncProgress::Retrying { attempt } => debug!(attempt, "capture contains a rejection"),
            _ => {}
        }
    }

    Err(RunnerError::Incomplete)
}

/// Replay a capture file.
pub fn replay_file(
    path: impl AsRef<Path>,
    chunk_size: usize,
    config: &SessionConfig,
) -> RunnerResult<SyncReport> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let mut report = replay_bytes("replay", &data, chunk_size, config)?;
    report.source = path.display().to_string();
    Ok(report)
}
