//! Shared helpers for driving the monitor against a mock port.

#![allow(dead_code)]

use serial_line_monitor::port::MockSerialPort;
use serial_line_monitor::{InterruptFlag, LineMonitor, MonitorConfig, MonitorError, PortError};
use std::io::{self, Write};
use std::time::Duration;

pub const MOCK_PORT: &str = "/dev/ttyMOCK0";

/// Monitor settings for tests: mock port name, no settle delay.
pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        port: MOCK_PORT.to_string(),
        settle_delay: Duration::ZERO,
        ..MonitorConfig::default()
    }
}

/// A mock port preloaded with `chunks` that raises `flag` once they are consumed.
pub fn scripted_port(chunks: &[&[u8]], flag: &InterruptFlag) -> MockSerialPort {
    let mut port = MockSerialPort::new(MOCK_PORT);
    for chunk in chunks {
        port.enqueue_read(chunk);
    }
    port.interrupt_when_drained(flag.clone());
    port
}

/// Everything a finished session left behind.
pub struct SessionOutcome {
    pub reason: MonitorError,
    pub output: String,
    pub port: MockSerialPort,
}

impl SessionOutcome {
    pub fn lines(&self) -> Vec<&str> {
        self.output.lines().collect()
    }

    /// Lines printed between the banner and the closing messages.
    pub fn received(&self) -> Vec<&str> {
        let lines = self.lines();
        let start = lines
            .iter()
            .position(|l| *l == "Serial Monitor Started - Waiting for output...")
            .map(|i| i + 3)
            .unwrap_or(lines.len());
        let end = lines
            .iter()
            .rposition(|l| *l == "Monitoring stopped by user" || l.starts_with("Error: "))
            .unwrap_or(lines.len());
        lines[start.min(end)..end]
            .iter()
            .copied()
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// Feed `chunks` to a fresh monitor and interrupt it once they are consumed.
pub fn run_until_drained(chunks: &[&[u8]], config: MonitorConfig) -> SessionOutcome {
    let flag = InterruptFlag::new();
    let port = scripted_port(chunks, &flag);
    run_with_port(port, config, flag)
}

/// Run a monitor on `port` and capture its output.
pub fn run_with_port(
    port: MockSerialPort,
    config: MonitorConfig,
    flag: InterruptFlag,
) -> SessionOutcome {
    let observer = port.clone();
    let mut monitor = LineMonitor::new(config, Vec::new()).with_interrupt(flag);
    let reason = monitor.run_with(move |_| Ok::<_, PortError>(port));
    let output = String::from_utf8(monitor.into_output()).expect("monitor output is UTF-8");

    SessionOutcome {
        reason,
        output,
        port: observer,
    }
}

/// Console double that records output and fails on demand.
#[derive(Debug, Default)]
pub struct BrokenConsole {
    written: Vec<u8>,
    fail_on: Option<&'static str>,
    writes_left: Option<usize>,
}

impl BrokenConsole {
    /// Fails any write whose bytes contain `marker`.
    pub fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_on: Some(marker),
            ..Self::default()
        }
    }

    /// Accepts `budget` writes, then fails every later one.
    pub fn failing_after(budget: usize) -> Self {
        Self {
            writes_left: Some(budget),
            ..Self::default()
        }
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

impl Write for BrokenConsole {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let marked = self
            .fail_on
            .is_some_and(|m| String::from_utf8_lossy(buf).contains(m));
        let exhausted = match self.writes_left.as_mut() {
            Some(0) => true,
            Some(left) => {
                *left -= 1;
                false
            }
            None => false,
        };
        if marked || exhausted {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout went away"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
