//! Port-specific error types.
//!
//! Kept apart from the monitor's own error taxonomy so the port layer can be
//! used and tested on its own.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Port configuration was rejected by the driver.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Attempted to use a port that has been closed.
    #[error("Port is not open")]
    NotOpen,

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a Timeout error from a duration.
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout(duration)
    }

    /// Whether this error only means "nothing arrived before the timeout".
    ///
    /// Real ports report `TimedOut`, non-blocking doubles report `WouldBlock`;
    /// both are treated as an idle poll rather than a failure.
    pub fn is_no_data(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}
