//! Mock transport for testing.
//!
//! Captures written bytes and tracks the receiver slot so tests can check
//! that a session claims and releases it correctly.

use super::{TransportError, UartTransport};

/// In-memory transport recording everything the session does.
#[derive(Debug, Default)]
pub struct MockTransport {
    sent: Vec<Vec<u8>>,
    receiver_attached: bool,
    attach_count: usize,
    detach_count: usize,
    fail_next_send: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write, in order.
    pub fn sent_messages(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// The most recent write.
    pub fn last_sent(&self) -> Option<&[u8]> {
        self.sent.last().map(Vec::as_slice)
    }

    /// Whether the receive handler is currently attached.
    pub fn receiver_attached(&self) -> bool {
        self.receiver_attached
    }

    /// Number of times the receiver was attached.
    pub fn attach_count(&self) -> usize {
        self.attach_count
    }

    /// Number of times the receiver was detached.
    pub fn detach_count(&self) -> usize {
        self.detach_count
    }

    /// Cause the next `transmit()` to fail.
    pub fn fail_next_send(&mut self, error: &str) {
        self.fail_next_send = Some(error.to_string());
    }
}

impl UartTransport for MockTransport {
    fn transmit(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if let Some(error) = self.fail_next_send.take() {
            return Err(TransportError::SendFailed(error));
        }
        self.sent.push(data.to_vec());
        Ok(())
    }

    fn attach_receiver(&mut self) {
        self.receiver_attached = true;
        self.attach_count += 1;
    }

    fn detach_receiver(&mut self) {
        self.receiver_attached = false;
        self.detach_count += 1;
    }
}
