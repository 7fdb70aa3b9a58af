use crate::port::PortError;
use thiserror::Error;

/// Why a monitoring session ended.
///
/// The monitor loop has no natural exit, so every session finishes with one
/// of these. `Interrupted` is the normal way out; everything else is fatal
/// and never retried.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The port could not be opened. No handle exists, nothing to close.
    #[error("could not open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: PortError,
    },

    /// Reading from an open port failed for a reason other than a timeout.
    #[error("read from {port} failed: {source}")]
    Read {
        port: String,
        #[source]
        source: PortError,
    },

    /// Received data could not be written to the console.
    #[error("console output failed: {0}")]
    Console(#[from] std::io::Error),

    /// The user asked the monitor to stop.
    #[error("monitoring stopped by user")]
    Interrupted,
}

impl MonitorError {
    pub fn open(port: impl Into<String>, source: PortError) -> Self {
        Self::Open {
            port: port.into(),
            source,
        }
    }

    pub fn read(port: impl Into<String>, source: PortError) -> Self {
        Self::Read {
            port: port.into(),
            source,
        }
    }

    /// `true` for the user-initiated stop, `false` for fatal errors.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Result type returned by the monitor.
pub type MonitorResult<T> = Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_open_error_display_and_source() {
        let err = MonitorError::open("/dev/ttyUSB9", PortError::not_found("/dev/ttyUSB9"));
        assert_eq!(
            err.to_string(),
            "could not open /dev/ttyUSB9: Serial port not found: /dev/ttyUSB9"
        );
        assert!(err.source().is_some());
        assert!(!err.is_interrupt());
    }

    #[test]
    fn test_read_error_display() {
        let err = MonitorError::read("COM3", PortError::NotOpen);
        assert_eq!(err.to_string(), "read from COM3 failed: Port is not open");
    }

    #[test]
    fn test_console_error_from_io() {
        let err: MonitorError = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert!(matches!(err, MonitorError::Console(_)));
        assert!(err.to_string().starts_with("console output failed"));
    }

    #[test]
    fn test_interrupt() {
        let err = MonitorError::Interrupted;
        assert!(err.is_interrupt());
        assert!(err.source().is_none());
    }
}
