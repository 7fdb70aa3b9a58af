//! Configuration schema definitions.
//!
//! Every section uses `#[serde(default)]`, so an empty file (or no file at
//! all) yields the compiled-in defaults.

use super::error::{ConfigError, ConfigResult};
use crate::monitor::{
    InvalidBytes, MonitorConfig, DEFAULT_BAUD, DEFAULT_PORT, DEFAULT_READ_TIMEOUT,
    DEFAULT_SETTLE_DELAY,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial port configuration
    pub serial: SerialConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the monitor cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.serial.port.trim().is_empty() {
            return Err(ConfigError::validation("serial.port", "must not be empty"));
        }
        if self.serial.baud == 0 {
            return Err(ConfigError::validation("serial.baud", "must be greater than zero"));
        }
        if self.serial.timeout_ms == 0 {
            return Err(ConfigError::validation(
                "serial.timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Build the monitor's settings from this configuration.
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            port: self.serial.port.clone(),
            baud_rate: self.serial.baud,
            read_timeout: self.serial.timeout(),
            settle_delay: self.serial.settle_delay(),
            invalid_bytes: self.serial.invalid_bytes,
        }
    }
}

/// Serial port configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port path or name
    pub port: String,
    /// Baud rate
    pub baud: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
    /// Delay after opening before the first read, in milliseconds
    pub settle_delay_ms: u64,
    /// Handling of bytes that are not valid UTF-8
    pub invalid_bytes: InvalidBytes,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud: DEFAULT_BAUD,
            timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            invalid_bytes: InvalidBytes::default(),
        }
    }
}

impl SerialConfig {
    /// Get the read timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the settle delay as Duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "compact", "pretty", "json"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable
    #[default]
    Compact,
    /// Multi-line with colors
    Pretty,
    /// JSON
    Json,
}
