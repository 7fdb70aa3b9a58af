//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that simulates serial port behavior without
//! requiring actual hardware. Supports a scripted read queue, close counting
//! and simulated failures.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use crate::monitor::InterruptFlag;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// What the mock does once its read queue runs dry.
#[derive(Debug, Default)]
enum DrainBehavior {
    /// Report "no data" (`WouldBlock`) forever.
    #[default]
    Idle,
    /// Raise the given interrupt flag, then report "no data".
    Interrupt(InterruptFlag),
    /// Fail the read with an I/O error of the given kind.
    Fail(io::ErrorKind),
}

/// Inner state of the mock port, protected by a mutex for interior mutability.
#[derive(Debug, Default)]
struct MockPortState {
    /// Chunks of bytes to be returned by read operations, one chunk per read.
    read_queue: VecDeque<Vec<u8>>,
    /// Whether the next read should time out.
    should_timeout: bool,
    /// Configured timeout duration.
    timeout: Duration,
    /// Number of `close` calls seen.
    close_count: usize,
    /// Number of `read_bytes` calls seen.
    read_count: usize,
    /// Behavior once `read_queue` is empty.
    on_drain: DrainBehavior,
}

/// Mock serial port implementation for testing.
///
/// Clones share state, so a test can hand one clone to the monitor and keep
/// another to inspect afterwards.
///
/// # Example
/// ```
/// use serial_line_monitor::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"Hello, World!\n");
///
/// let mut buffer = [0u8; 32];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"Hello, World!\n");
///
/// port.close().unwrap();
/// assert_eq!(port.close_count(), 1);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    /// The port name/identifier.
    name: String,
    /// The internal state, wrapped in Arc<Mutex<>> for interior mutability.
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_secs(1),
                ..Default::default()
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockPortState> {
        // A poisoned lock only happens after a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue a chunk to be returned by a subsequent read.
    ///
    /// Each chunk is delivered by its own read call (split only if the
    /// caller's buffer is smaller), mimicking bytes arriving in bursts.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state().read_queue.push_back(data.to_vec());
    }

    /// Set whether the next read operation should time out.
    pub fn set_should_timeout(&mut self, should_timeout: bool) {
        self.state().should_timeout = should_timeout;
    }

    /// Raise `flag` the first time a read finds the queue empty.
    pub fn interrupt_when_drained(&mut self, flag: InterruptFlag) {
        self.state().on_drain = DrainBehavior::Interrupt(flag);
    }

    /// Fail every read with `kind` once the queue is empty.
    pub fn fail_when_drained(&mut self, kind: io::ErrorKind) {
        self.state().on_drain = DrainBehavior::Fail(kind);
    }

    /// Number of times `close` has been called.
    pub fn close_count(&self) -> usize {
        self.state().close_count
    }

    /// Number of times `read_bytes` has been called.
    pub fn read_count(&self) -> usize {
        self.state().read_count
    }

    /// Get the number of bytes still queued.
    pub fn available_bytes(&self) -> usize {
        self.state().read_queue.iter().map(Vec::len).sum()
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state();
        state.read_count += 1;

        if state.close_count > 0 {
            return Err(PortError::NotOpen);
        }

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.timeout));
        }

        if let Some(mut chunk) = state.read_queue.pop_front() {
            let n = chunk.len().min(buffer.len());
            buffer[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                let rest = chunk.split_off(n);
                state.read_queue.push_front(rest);
            }
            return Ok(n);
        }

        match &state.on_drain {
            DrainBehavior::Idle => {}
            DrainBehavior::Interrupt(flag) => flag.trigger(),
            DrainBehavior::Fail(kind) => {
                return Err(PortError::Io(io::Error::new(*kind, "simulated read failure")))
            }
        }

        // Simulate "would block" behavior by returning an I/O error
        Err(PortError::Io(io::Error::new(
            io::ErrorKind::WouldBlock,
            "No data available",
        )))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.state().timeout = timeout;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PortError> {
        self.state().close_count += 1;
        Ok(())
    }

    fn bytes_to_read(&self) -> Option<usize> {
        Some(self.available_bytes())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}
