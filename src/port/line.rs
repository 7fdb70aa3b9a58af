//! Newline framing on top of a [`SerialPortAdapter`].
//!
//! `LineReader` behaves like a serial `readline` with a timeout: it returns
//! everything up to and including `\n`, or whatever partial data arrived once
//! the timeout expires.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use std::time::{Duration, Instant};

const READ_CHUNK: usize = 256;
const LINE_TERMINATOR: u8 = b'\n';

/// Buffers raw bytes from a port and hands them out one line at a time.
#[derive(Debug)]
pub struct LineReader {
    buffer: Vec<u8>,
    timeout: Duration,
}

impl LineReader {
    /// Create a reader whose `read_line` gives up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            buffer: Vec::with_capacity(READ_CHUNK),
            timeout,
        }
    }

    /// Bytes received but not yet returned as part of a line.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Read the next line from `port`.
    ///
    /// Returns `Ok(Some(bytes))` with the terminator still attached when a
    /// full line is available, `Ok(Some(partial))` when the timeout expires
    /// with some data buffered, and `Ok(None)` when nothing arrived at all.
    /// Errors other than "no data" are passed through.
    pub fn read_line<P>(&mut self, port: &mut P) -> Result<Option<Vec<u8>>, PortError>
    where
        P: SerialPortAdapter + ?Sized,
    {
        let deadline = Instant::now() + self.timeout;
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }

            match port.read_bytes(&mut chunk) {
                Ok(0) => return Ok(self.take_partial()),
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.is_no_data() => return Ok(self.take_partial()),
                Err(e) => return Err(e),
            }

            if Instant::now() >= deadline && !self.has_line() {
                return Ok(self.take_partial());
            }
        }
    }

    fn has_line(&self) -> bool {
        memchr::memchr(LINE_TERMINATOR, &self.buffer).is_some()
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let end = memchr::memchr(LINE_TERMINATOR, &self.buffer)?;
        let rest = self.buffer.split_off(end + 1);
        Some(std::mem::replace(&mut self.buffer, rest))
    }

    fn take_partial(&mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockSerialPort;
    use proptest::prelude::*;
    use std::io;

    fn reader() -> LineReader {
        LineReader::new(Duration::from_secs(1))
    }

    #[test]
    fn test_single_line() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"boot ok\r\n");

        let mut reader = reader();
        assert_eq!(reader.read_line(&mut port).unwrap(), Some(b"boot ok\r\n".to_vec()));
        assert_eq!(reader.read_line(&mut port).unwrap(), None);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"tem");
        port.enqueue_read(b"p=21");
        port.enqueue_read(b".5\n");

        let mut reader = reader();
        assert_eq!(reader.read_line(&mut port).unwrap(), Some(b"temp=21.5\n".to_vec()));
    }

    #[test]
    fn test_several_lines_in_one_chunk() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"a\nb\nc");

        let mut reader = reader();
        assert_eq!(reader.read_line(&mut port).unwrap(), Some(b"a\n".to_vec()));
        assert_eq!(reader.pending(), b"b\nc");
        assert_eq!(reader.read_line(&mut port).unwrap(), Some(b"b\n".to_vec()));
        // No terminator and nothing more arriving: the partial line is flushed.
        assert_eq!(reader.read_line(&mut port).unwrap(), Some(b"c".to_vec()));
        assert!(reader.pending().is_empty());
    }

    #[test]
    fn test_timeout_is_not_an_error() {
        let mut port = MockSerialPort::new("MOCK0");
        port.set_should_timeout(true);

        let mut reader = reader();
        assert_eq!(reader.read_line(&mut port).unwrap(), None);
    }

    #[test]
    fn test_hard_error_is_propagated() {
        let mut port = MockSerialPort::new("MOCK0");
        port.fail_when_drained(io::ErrorKind::BrokenPipe);

        let mut reader = reader();
        let err = reader.read_line(&mut port).unwrap_err();
        assert!(matches!(err, PortError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_zero_timeout_still_returns_complete_lines() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"x\ny\n");

        let mut reader = LineReader::new(Duration::ZERO);
        assert_eq!(reader.read_line(&mut port).unwrap(), Some(b"x\n".to_vec()));
        assert_eq!(reader.read_line(&mut port).unwrap(), Some(b"y\n".to_vec()));
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_lines(
            lines in proptest::collection::vec("[a-z0-9 ]{0,20}", 1..8),
            cuts in proptest::collection::vec(1usize..16, 0..12),
        ) {
            let stream: Vec<u8> = lines.iter().flat_map(|l| format!("{l}\n").into_bytes()).collect();

            let mut port = MockSerialPort::new("MOCK0");
            let mut rest = stream.as_slice();
            for cut in cuts {
                if rest.is_empty() {
                    break;
                }
                let (head, tail) = rest.split_at(cut.min(rest.len()));
                port.enqueue_read(head);
                rest = tail;
            }
            if !rest.is_empty() {
                port.enqueue_read(rest);
            }

            let mut reader = reader();
            let mut seen = Vec::new();
            while let Some(line) = reader.read_line(&mut port).unwrap() {
                seen.push(String::from_utf8(line).unwrap());
            }

            let expected: Vec<String> = lines.iter().map(|l| format!("{l}\n")).collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
