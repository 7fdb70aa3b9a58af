//! Port abstraction layer for serial communication.
//!
//! Provides the adapter trait, the real `serialport` backed implementation,
//! a mock for tests and newline framing on top of either.

pub mod error;
pub mod line;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use line::LineReader;
pub use mock::MockSerialPort;
pub use sync_port::{list_ports, PortListing, SyncSerialPort};
pub use traits::{PortConfiguration, SerialPortAdapter};
