//! Configuration for the EVlink poller.

use evlink_common::LoggingConfig;
use evlink_common::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete poller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// The wallbox to poll.
    pub device: DeviceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for the polled wallbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name (used in readings and logs).
    #[serde(default = "default_device_name")]
    pub name: String,

    /// Host IP address (no name resolution; `host:port` must parse as a
    /// socket address).
    pub host: String,

    /// Modbus TCP port (default: 502).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Modbus unit/slave ID (1-247, default: 1).
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Poll interval in seconds (default: 30).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Connect/read timeout in milliseconds (default: 3000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_device_name() -> String {
    "evlink".to_string()
}

fn default_port() -> u16 {
    502
}

fn default_unit_id() -> u8 {
    1
}

fn default_poll_interval() -> u64 {
    30
}

fn default_timeout_ms() -> u64 {
    3000
}

impl PollerConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: PollerConfig = evlink_common::load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let device = &self.device;

        if device.host.is_empty() {
            return Err(Error::Config("Device host cannot be empty".to_string()));
        }

        if device.unit_id == 0 {
            return Err(Error::Config(format!(
                "Device '{}': unit_id must be 1-247",
                device.name
            )));
        }

        if device.poll_interval_secs == 0 {
            return Err(Error::Config(format!(
                "Device '{}': poll_interval_secs must be at least 1",
                device.name
            )));
        }

        if device.timeout_ms == 0 {
            return Err(Error::Config(format!(
                "Device '{}': timeout_ms must be at least 1",
                device.name
            )));
        }

        Ok(())
    }
}
