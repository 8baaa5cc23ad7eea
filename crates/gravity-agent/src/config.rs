//! Session configuration.

use gravity_protocol::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};

/// Default number of re-issued requests before a session gives up.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Configuration for a sync session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Response buffer capacity in bytes.
    pub buffer_capacity: usize,
    /// Requests re-issued after `Unrecognized command` before failing.
    /// `None` retries forever.
    pub max_retries: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            buffer_capacity: DEFAULT_CAPACITY,
            max_retries: Some(DEFAULT_MAX_RETRIES),
        }
    }
}

impl SessionConfig {
    /// Whether another retry is allowed after `retries` have already been made.
    pub fn allows_retry(&self, retries: u32) -> bool {
        self.max_retries.map_or(true, |max| retries < max)
    }
}
