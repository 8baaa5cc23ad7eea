//! Gravity sync runner.
//!
//! Drives a [`gravity_agent::SyncSession`] against a real device through a
//! TCP serial bridge, or against a captured response file, and renders the
//! resulting settings.

pub mod bridge;
pub mod config;
pub mod error;
pub mod output;
pub mod replay;

pub use bridge::{sync_over_tcp, BridgeTransport};
pub use config::DeviceConfig;
pub use error::{RunnerError, RunnerResult};
pub use output::{OutputFormat, SyncReport};
pub use replay::{replay_bytes, replay_file};
