//! The line monitor: open a port, print every line it sends, stop on request.
//!
//! ```text
//! NotOpened ──open ok──▶ Opened ──settle + banner──▶ Monitoring ──interrupt / error──▶ Closed
//!     └──────────────────────open failed─────────────────────────────────────────────▶ Closed
//! ```

use crate::error::{MonitorError, MonitorResult};
use crate::port::{LineReader, PortConfiguration, PortError, SerialPortAdapter, SyncSerialPort};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: &str = "/dev/tty.usbserial-0001";
/// Baud rate used when nothing else is configured.
pub const DEFAULT_BAUD: u32 = 115_200;
/// How long a single line read may wait for data.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);
/// Pause between opening the port and the first read.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

const BANNER_RULE_WIDTH: usize = 60;

/// What to do with bytes that are not valid UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidBytes {
    /// Substitute U+FFFD for each invalid sequence.
    #[default]
    Replace,
    /// Leave invalid sequences out.
    Drop,
}

/// Everything the monitor needs to know before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// System path or name of the serial port.
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
    pub settle_delay: Duration,
    pub invalid_bytes: InvalidBytes,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD,
            read_timeout: DEFAULT_READ_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            invalid_bytes: InvalidBytes::default(),
        }
    }
}

impl MonitorConfig {
    /// Link parameters to open the port with.
    pub fn port_configuration(&self) -> PortConfiguration {
        PortConfiguration {
            baud_rate: self.baud_rate,
            timeout: self.read_timeout,
        }
    }
}

/// Shared stop request, raised from a signal handler and polled by the loop.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    NotOpened,
    Opened,
    Monitoring,
    Closed,
}

/// Decode one raw line and strip trailing whitespace, including the terminator.
pub fn decode_line(raw: &[u8], policy: InvalidBytes) -> String {
    let text = match policy {
        InvalidBytes::Replace => String::from_utf8_lossy(raw).into_owned(),
        InvalidBytes::Drop => decode_dropping_invalid(raw),
    };
    text.trim_end().to_string()
}

fn decode_dropping_invalid(mut raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len());
    loop {
        match std::str::from_utf8(raw) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = raw.split_at(e.valid_up_to());
                // valid_up_to guarantees this prefix is UTF-8.
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => raw = &rest[len..],
                    // Truncated sequence at the end of the line.
                    None => return out,
                }
            }
        }
    }
}

/// Prints lines arriving on a serial port to `out` until interrupted.
pub struct LineMonitor<W: Write> {
    config: MonitorConfig,
    out: W,
    interrupt: InterruptFlag,
    state: MonitorState,
}

impl<W: Write> LineMonitor<W> {
    pub fn new(config: MonitorConfig, out: W) -> Self {
        Self {
            config,
            out,
            interrupt: InterruptFlag::new(),
            state: MonitorState::NotOpened,
        }
    }

    /// Use an externally owned interrupt flag (e.g. one wired to Ctrl+C).
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Consume the monitor and hand back its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Monitor the configured hardware port.
    ///
    /// Returns the reason the session ended once the port has been closed.
    pub fn run(&mut self) -> MonitorError {
        self.run_with(|config| SyncSerialPort::open(&config.port, &config.port_configuration()))
    }

    /// Monitor a port produced by `open`.
    ///
    /// The port is closed exactly once if `open` succeeded and never touched
    /// otherwise.
    pub fn run_with<P, F>(&mut self, open: F) -> MonitorError
    where
        P: SerialPortAdapter,
        F: FnOnce(&MonitorConfig) -> Result<P, PortError>,
    {
        self.announce();

        let mut port = match open(&self.config) {
            Ok(port) => port,
            Err(source) => {
                let reason = MonitorError::open(self.config.port.as_str(), source);
                self.state = MonitorState::Closed;
                self.report(&reason);
                return reason;
            }
        };
        self.state = MonitorState::Opened;

        let reason = match self.session(&mut port) {
            Ok(never) => match never {},
            Err(reason) => reason,
        };

        self.report(&reason);
        self.close(&mut port);
        reason
    }

    fn session<P>(&mut self, port: &mut P) -> MonitorResult<Infallible>
    where
        P: SerialPortAdapter,
    {
        let name = port.name().to_string();
        port.set_timeout(self.config.read_timeout)
            .map_err(|e| MonitorError::read(name.as_str(), e))?;

        tracing::debug!(delay = ?self.config.settle_delay, "waiting for device to settle");
        std::thread::sleep(self.config.settle_delay);
        if self.interrupt.is_triggered() {
            return Err(MonitorError::Interrupted);
        }

        self.banner()?;
        self.state = MonitorState::Monitoring;

        let mut reader = LineReader::new(self.config.read_timeout);
        loop {
            if self.interrupt.is_triggered() {
                tracing::debug!(unread = ?port.bytes_to_read(), "interrupt received");
                return Err(MonitorError::Interrupted);
            }

            let raw = match reader.read_line(port) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => return Err(MonitorError::read(name.as_str(), e)),
            };

            let line = decode_line(&raw, self.config.invalid_bytes);
            if !line.is_empty() {
                self.print_line(&line)?;
            }
        }
    }

    fn print_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }

    fn announce(&mut self) {
        // Console failures only end a session once a port is open.
        let _ = writeln!(
            self.out,
            "Opening {} at {} baud...",
            self.config.port, self.config.baud_rate
        );
        let _ = writeln!(self.out, "Press Ctrl+C to exit\n");
        let _ = self.out.flush();
    }

    fn banner(&mut self) -> io::Result<()> {
        let rule = "=".repeat(BANNER_RULE_WIDTH);
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "Serial Monitor Started - Waiting for output...")?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn report(&mut self, reason: &MonitorError) {
        match reason {
            MonitorError::Interrupted => {
                let _ = writeln!(self.out, "\n\nMonitoring stopped by user");
            }
            other => {
                tracing::debug!(error = ?other, "monitoring session failed");
                let _ = writeln!(self.out, "Error: {other}");
            }
        }
        let _ = self.out.flush();
    }

    fn close<P: SerialPortAdapter>(&mut self, port: &mut P) {
        if let Err(e) = port.close() {
            tracing::warn!(port = port.name(), error = %e, "error while closing serial port");
        }
        self.state = MonitorState::Closed;
        let _ = writeln!(self.out, "Serial port closed");
        let _ = self.out.flush();
    }
}
