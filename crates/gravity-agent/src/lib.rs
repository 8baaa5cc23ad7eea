//! Gravity settings mirror.
//!
//! This crate keeps a local copy of the configuration of an ESP32 running the
//! Gravity firmware and refreshes it over the UART console:
//!
//! 1. [`SyncSession::start_sync`] writes `sync\n` and attaches the receiver
//! 2. every received chunk goes to [`SyncSession::on_receive`]
//! 3. once the prompt arrives the response is run through the
//!    [`SyncDispatcher`], which updates the [`SettingsModel`]
//! 4. an `Unrecognized command` reply triggers a fresh request
//!
//! The menu layer reads the mirrored values through [`SyncSession::settings`].

mod config;
mod dispatch;
mod error;
mod session;
mod settings;
pub mod transport;

pub use config::*;
pub use dispatch::*;
pub use error::*;
pub use session::*;
pub use settings::*;
pub use transport::{MockTransport, TransportError, UartTransport};
