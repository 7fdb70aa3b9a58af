//! Synchronous serial port implementation.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own
//! `SerialPortAdapter` trait so the monitor can be tested against a double.

use super::error::PortError;
use super::traits::{PortConfiguration, SerialPortAdapter};
use std::fmt;
use std::io::Read;
use std::time::Duration;

/// Synchronous serial port implementation wrapping `serialport::SerialPort`.
pub struct SyncSerialPort {
    /// The underlying serial port, `None` once closed.
    port: Option<Box<dyn serialport::SerialPort>>,
    /// The port name/path for identification.
    name: String,
}

impl SyncSerialPort {
    /// Open a serial port with the given configuration.
    ///
    /// # Arguments
    /// * `port_name` - The system path to the serial port (e.g., "/dev/ttyUSB0" or "COM3")
    /// * `config` - Baud rate and read timeout
    ///
    /// # Example
    /// ```no_run
    /// use serial_line_monitor::port::{PortConfiguration, SyncSerialPort};
    ///
    /// let config = PortConfiguration::default();
    /// let port = SyncSerialPort::open("/dev/ttyUSB0", &config)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port_name: &str, config: &PortConfiguration) -> Result<Self, PortError> {
        let port = serialport::new(port_name, config.baud_rate)
            .timeout(config.timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice
                | serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => {
                    PortError::not_found(port_name)
                }
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        tracing::debug!(port = port_name, baud = config.baud_rate, "serial port opened");

        Ok(Self {
            port: Some(port),
            name: port_name.to_string(),
        })
    }

    fn inner(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>, PortError> {
        self.port.as_mut().ok_or(PortError::NotOpen)
    }
}

impl SerialPortAdapter for SyncSerialPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        self.inner()?.read(buffer).map_err(PortError::Io)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.inner()?.set_timeout(timeout).map_err(PortError::Serial)
    }

    fn close(&mut self) -> Result<(), PortError> {
        // Dropping the boxed port releases the file descriptor / handle.
        if self.port.take().is_some() {
            tracing::debug!(port = %self.name, "serial port closed");
        }
        Ok(())
    }

    fn bytes_to_read(&self) -> Option<usize> {
        self.port
            .as_ref()
            .and_then(|p| p.bytes_to_read().ok())
            .map(|n| n as usize)
    }
}

impl fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.port.as_ref().and_then(|p| p.baud_rate().ok()))
            .field("open", &self.port.is_some())
            .finish()
    }
}

/// A serial port visible to the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortListing {
    /// System path or name (e.g., "/dev/ttyUSB0", "COM3").
    pub name: String,
    /// Human readable description of the port type.
    pub kind: String,
}

impl fmt::Display for PortListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.name, self.kind)
    }
}

/// Enumerate the serial ports available on this machine.
pub fn list_ports() -> Result<Vec<PortListing>, PortError> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| PortListing {
            kind: describe_port_type(&p.port_type),
            name: p.port_name,
        })
        .collect())
}

fn describe_port_type(port_type: &serialport::SerialPortType) -> String {
    match port_type {
        serialport::SerialPortType::UsbPort(usb) => {
            let mut desc = format!("USB {:04x}:{:04x}", usb.vid, usb.pid);
            if let Some(ref product) = usb.product {
                desc.push(' ');
                desc.push_str(product);
            }
            if let Some(ref manufacturer) = usb.manufacturer {
                desc.push_str(&format!(" ({manufacturer})"));
            }
            desc
        }
        serialport::SerialPortType::PciPort => "PCI".to_string(),
        serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        serialport::SerialPortType::Unknown => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_error() {
        let config = PortConfiguration::default();
        let result = SyncSerialPort::open("/dev/nonexistent_port_12345", &config);

        assert!(result.is_err());
        if let Err(e) = result {
            match e {
                PortError::NotFound(name) => {
                    assert!(name.contains("nonexistent"));
                }
                _ => panic!("Expected NotFound error, got: {:?}", e),
            }
        }
    }

    #[test]
    fn test_describe_port_types() {
        assert_eq!(describe_port_type(&serialport::SerialPortType::PciPort), "PCI");
        assert_eq!(
            describe_port_type(&serialport::SerialPortType::Unknown),
            "Unknown"
        );

        let usb = serialport::SerialPortType::UsbPort(serialport::UsbPortInfo {
            vid: 0x10c4,
            pid: 0xea60,
            serial_number: None,
            manufacturer: Some("Silicon Labs".to_string()),
            product: Some("CP2102".to_string()),
        });
        assert_eq!(describe_port_type(&usb), "USB 10c4:ea60 CP2102 (Silicon Labs)");
    }

    #[test]
    fn test_listing_display() {
        let listing = PortListing {
            name: "/dev/ttyUSB0".to_string(),
            kind: "PCI".to_string(),
        };
        assert_eq!(listing.to_string(), "/dev/ttyUSB0\tPCI");
    }
}
