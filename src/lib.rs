//! Serial Line Monitor Library
//!
//! Opens a serial port and prints every line it receives to the console until
//! interrupted.
//!
//! # Modules
//!
//! - `config`: Configuration management with TOML support
//! - `error`: Why a monitoring session ended
//! - `logging`: Diagnostic logging to stderr
//! - `monitor`: The line monitor itself
//! - `port`: Port abstraction layer for serial communication

pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod port;

// Re-export commonly used types for convenience
pub use error::{MonitorError, MonitorResult};
pub use monitor::{
    decode_line, InterruptFlag, InvalidBytes, LineMonitor, MonitorConfig, MonitorState,
};
pub use port::{
    LineReader, MockSerialPort, PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort,
};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
