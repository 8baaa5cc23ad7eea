//! TCP bridge to a device UART.
//!
//! The serial port is exposed over TCP (ser2net, an ESP-LINK, a bench
//! adapter). Writes from the session go through a bounded channel to a
//! writer task; the read loop feeds every chunk into the session until the
//! response completes or the device goes quiet.

use std::time::Duration;

use gravity_agent::{DispatchSummary, SyncProgress, SyncSession, TransportError, UartTransport};
use gravity_metrics::SessionLabels;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::output::SyncReport;

/// Queue depth between the session and the writer task.
pub const TX_QUEUE_DEPTH: usize = 256;

/// Transport label used in metrics.
pub const TRANSPORT_LABEL: &str = "tcp";

const READ_CHUNK: usize = 1024;

/// Session transport writing into the bridge's TX queue.
#[derive(Debug)]
pub struct BridgeTransport {
    tx_sender: mpsc::Sender<Vec<u8>>,
    receiving: bool,
}

impl BridgeTransport {
    /// Wrap the sending half of the TX queue.
    pub fn new(tx_sender: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            tx_sender,
            receiving: false,
        }
    }

    /// Whether the session has claimed incoming data.
    pub fn is_receiving(&self) -> bool {
        self.receiving
    }
}

impl UartTransport for BridgeTransport {
    fn transmit(&mut self, data: &[u8]) -> Result<(), TransportError> {
        match self.tx_sender.try_send(data.to_vec()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                Err(TransportError::SendFailed("TX queue full".to_string()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(TransportError::NotConnected),
        }
    }

    fn attach_receiver(&mut self) {
        self.receiving = true;
    }

    fn detach_receiver(&mut self) {
        self.receiving = false;
    }
}

fn spawn_writer(
    mut writer: OwnedWriteHalf,
    mut tx_receiver: mpsc::Receiver<Vec<u8>>,
) -> JoinHandle<std::io::Result<()>> {
    tokio::spawn(async move {
        while let Some(data) = tx_receiver.recv().await {
            writer.write_all(&data).await?;
            writer.flush().await?;
        }
        writer.shutdown().await
    })
}

/// Connect to the bridge and run one sync.
pub async fn sync_over_tcp(config: &DeviceConfig) -> RunnerResult<SyncReport> {
    let connect_timeout = config.connect_timeout_ms;
    let stream = match timeout(
        Duration::from_millis(connect_timeout),
        TcpStream::connect(&config.address),
    )
    .await
    {
        Ok(stream) => stream?,
        Err(_) => return Err(RunnerError::Timeout(connect_timeout)),
    };
    stream.set_nodelay(true)?;
    info!(device = %config.name, address = %config.address, "connected to bridge");

    let (mut reader, writer) = stream.into_split();
    let (tx_sender, tx_receiver) = mpsc::channel(TX_QUEUE_DEPTH);
    let writer_task = spawn_writer(writer, tx_receiver);

    let labels = SessionLabels::new(config.name.clone(), TRANSPORT_LABEL);
    let mut session = SyncSession::with_labels(
        BridgeTransport::new(tx_sender),
        config.session.clone(),
        labels,
    );

    let result = drive(&mut session, &mut reader, config.read_timeout_ms).await;
    let settings = session.settings().clone();
    let attempts = session.retries() + 1;
    drop(session);

    match writer_task.await {
        Ok(Err(e)) => warn!("bridge writer failed: {}", e),
        Err(e) => warn!("bridge writer task aborted: {}", e),
        Ok(Ok(())) => {}
    }

    let summary = result?;
    Ok(SyncReport {
        device: config.name.clone(),
        source: config.address.clone(),
        attempts,
        summary,
        settings,
    })
}

async fn drive<R>(
    session: &mut SyncSession<BridgeTransport>,
    reader: &mut R,
    read_timeout_ms: u64,
) -> RunnerResult<DispatchSummary>
where
    R: AsyncRead + Unpin,
{
    let read_timeout = Duration::from_millis(read_timeout_ms);
    let mut read_buf = [0u8; READ_CHUNK];

    session.start_sync()?;

    loop {
        let n = match timeout(read_timeout, reader.read(&mut read_buf)).await {
            Ok(Ok(0)) => return Err(RunnerError::Disconnected),
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                session.cleanup();
                return Err(RunnerError::Timeout(read_timeout_ms));
            }
        };

        if !session.transport().is_receiving() {
            debug!("discarding {} bytes with no sync in flight", n);
            continue;
        }

        match session.on_receive(&read_buf[..n])? {
            SyncProgress::Completed(summary) => return Ok(summary),
            SyncProgress::Failed { attempts } => {
                return Err(RunnerError::RetriesExhausted { attempts })
            }
            SyncProgress::Retrying { attempt } => {
                info!(attempt, "firmware did not recognise sync, retrying");
            }
            SyncProgress::Overflow { dropped } => {
                debug!(dropped, "response larger than buffer");
            }
            SyncProgress::Pending | SyncProgress::Ignored => {}
        }
    }
}
