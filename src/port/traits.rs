//! Core traits for serial port abstraction.
//!
//! Defines the `SerialPortAdapter` trait that allows both real serial ports
//! and mock implementations to be driven by the monitor interchangeably.

use super::error::PortError;
use std::time::Duration;

/// Link parameters used when opening a serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Read timeout.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Trait for the read side of a serial port.
///
/// The monitor only ever needs open, poll, read and close; opening is done by
/// the concrete type's constructor, the rest lives here.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. A timeout with nothing
    /// received is reported as an error for which
    /// [`PortError::is_no_data`] returns `true`.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Set the read timeout for this port.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Release the underlying device.
    ///
    /// Reads after `close` fail with [`PortError::NotOpen`].
    fn close(&mut self) -> Result<(), PortError>;

    /// Get the current bytes available to read (if supported).
    ///
    /// Returns `None` if the operation is not supported or cannot be determined.
    fn bytes_to_read(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let config = PortConfiguration::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }
}
