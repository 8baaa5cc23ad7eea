//! UART transport abstraction.
//!
//! The session only needs two things from the serial link: a way to write the
//! request and a single receive handler slot that it can claim while a sync is
//! in flight. Incoming bytes are pushed into the session by whoever owns the
//! receive path (an interrupt callback, a reader task, a test).

mod mock;

pub use mock::MockTransport;

use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The link is not open.
    #[error("not connected")]
    NotConnected,

    /// The request could not be written.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A UART link to the firmware.
pub trait UartTransport {
    /// Write bytes to the firmware.
    fn transmit(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Route received bytes to the session.
    fn attach_receiver(&mut self);

    /// Stop routing received bytes to the session.
    fn detach_receiver(&mut self);
}

impl<T: UartTransport + ?Sized> UartTransport for Box<T> {
    fn transmit(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).transmit(data)
    }

    fn attach_receiver(&mut self) {
        (**self).attach_receiver()
    }

    fn detach_receiver(&mut self) {
        (**self).detach_receiver()
    }
}
