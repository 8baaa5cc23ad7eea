//! Device configuration.
//!
//! Loaded from YAML, with every field optional:
//!
//! ```yaml
//! name: bench-esp32
//! address: 127.0.0.1:9000
//! read_timeout_ms: 3000
//! session:
//!   buffer_capacity: 256
//!   max_retries: 5
//! ```

use std::path::Path;

use gravity_agent::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::error::RunnerResult;

/// Default bridge address.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:9000";

/// Default time to wait for each chunk from the device.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 3000;

/// Default time to wait for the bridge to accept the connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// How to reach a device and how to run its sync session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Name used in logs and metric labels.
    pub name: String,
    /// `host:port` of the TCP bridge exposing the UART.
    pub address: String,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-read timeout in milliseconds.
    pub read_timeout_ms: u64,
    /// Session settings.
    pub session: SessionConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            name: "gravity".to_string(),
            address: DEFAULT_ADDRESS.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            session: SessionConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Parse a YAML document.
    pub fn from_yaml(text: &str) -> RunnerResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a YAML file.
    pub fn load(path: impl AsRef<Path>) -> RunnerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.session.buffer_capacity, 256);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = DeviceConfig::from_yaml(
            "name: bench\nsession:\n  max_retries: 2\n",
        )
        .unwrap();
        assert_eq!(config.name, "bench");
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.session.max_retries, Some(2));
        assert_eq!(config.session.buffer_capacity, 256);
    }

    #[test]
    fn test_unbounded_retries() {
        let config = DeviceConfig::from_yaml("session:\n  max_retries: null\n").unwrap();
        assert_eq!(config.session.max_retries, None);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(DeviceConfig::from_yaml("read_timeout_ms: soon").is_err());
    }
}
