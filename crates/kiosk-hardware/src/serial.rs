//! Serial-attached card reader.
//!
//! Most USB card readers show up as a serial device and print one card per
//! line, optionally followed by the text stored on the card:
//!
//! ```text
//! 123456789\r\n
//! 987654321,member\r\n
//! 555\tguest\n
//! ```
//!
//! [`SerialCardReader::try_read`] only consumes bytes the driver has already
//! buffered, so it never waits for the next card. Partial lines are kept in a
//! [`LineFramer`] until their terminator arrives.

use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::sync::Mutex;
use std::time::Duration;

use bytes::BytesMut;
use kiosk_core::constants::{DEFAULT_SERIAL_BAUD, DEFAULT_SERIAL_PORT, MAX_CARD_ID_LENGTH};
use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info, warn};

use crate::{
    HardwareError, Result,
    traits::{CardRead, CardReader},
    types::{LedColor, ReaderInfo, ReaderMode},
};

/// Largest chunk pulled from the driver per `try_read()`.
const READ_CHUNK: usize = 256;

/// Longest line accepted before the buffer is considered garbage.
///
/// Room for an identifier, a separator and a payload of similar size.
const MAX_LINE_LENGTH: usize = MAX_CARD_ID_LENGTH * 4;

/// Serial reader configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialReaderConfig {
    /// Device path (e.g., `/dev/ttyUSB0`, `COM3`).
    pub port_path: String,

    /// Line speed in bits per second.
    pub baud_rate: u32,

    /// Timeout for individual port reads and writes.
    pub io_timeout: Duration,
}

impl Default for SerialReaderConfig {
    fn default() -> Self {
        Self {
            port_path: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_SERIAL_BAUD,
            io_timeout: Duration::from_millis(50),
        }
    }
}

impl SerialReaderConfig {
    /// Create a configuration for the given device path.
    pub fn new(port_path: impl Into<String>) -> Self {
        Self {
            port_path: port_path.into(),
            ..Default::default()
        }
    }

    /// Set the baud rate.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the per-operation I/O timeout.
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }
}

/// Splits the serial byte stream into card reads.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: BytesMut,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes received from the port.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet framed.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete, non-blank line as a card read.
    ///
    /// # Errors
    ///
    /// Returns `InvalidData` if a line is not UTF-8, or if the buffer grows
    /// past the line limit without a terminator. In both cases the offending
    /// bytes are discarded so the next call starts clean.
    pub fn next_read(&mut self) -> Result<Option<CardRead>> {
        loop {
            let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') else {
                if self.buffer.len() > MAX_LINE_LENGTH {
                    let dropped = self.buffer.len();
                    self.buffer.clear();
                    return Err(HardwareError::invalid_data(format!(
                        "discarded {dropped} bytes without line terminator"
                    )));
                }
                return Ok(None);
            };

            let line = self.buffer.split_to(newline + 1);
            let text = std::str::from_utf8(&line)
                .map_err(|e| HardwareError::invalid_data(format!("non UTF-8 line: {e}")))?;

            if let Some(read) = parse_line(text) {
                return Ok(Some(read));
            }
        }
    }
}

/// Parse `<id>[,<payload>]` or `<id>[\t<payload>]`. Blank lines yield `None`.
fn parse_line(line: &str) -> Option<CardRead> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let read = match line.split_once([',', '\t']) {
        Some((identifier, payload)) => CardRead::builder(identifier).payload(payload).build(),
        None => CardRead::new(line),
    };
    Some(read)
}

/// Card reader attached through a serial port.
pub struct SerialCardReader {
    /// Open port, `None` after shutdown
    port: Option<Mutex<Box<dyn SerialPort>>>,

    config: SerialReaderConfig,

    framer: LineFramer,
}

impl fmt::Debug for SerialCardReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialCardReader")
            .field("port_path", &self.config.port_path)
            .field("baud_rate", &self.config.baud_rate)
            .field("open", &self.port.is_some())
            .field("pending", &self.framer.pending())
            .finish()
    }
}

impl SerialCardReader {
    /// Open the configured port.
    ///
    /// Anything the reader buffered before the service started is discarded.
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the port cannot be opened. The
    /// caller is expected to fall back to a disabled reader.
    pub fn open(config: SerialReaderConfig) -> Result<Self> {
        let port = serialport::new(&config.port_path, config.baud_rate)
            .timeout(config.io_timeout)
            .open()
            .map_err(|e| {
                HardwareError::initialization_failed(format!("{}: {e}", config.port_path))
            })?;

        if let Err(e) = port.clear(ClearBuffer::Input) {
            warn!("Failed to clear stale input on {}: {}", config.port_path, e);
        }

        info!(
            port = %config.port_path,
            baud = config.baud_rate,
            "Serial card reader opened"
        );

        Ok(Self {
            port: Some(Mutex::new(port)),
            config,
            framer: LineFramer::new(),
        })
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        let port = self
            .port
            .as_mut()
            .ok_or_else(|| HardwareError::disconnected(self.config.port_path.clone()))?;

        port.get_mut()
            .map_err(|_| HardwareError::communication("serial port lock poisoned"))
    }
}

impl CardReader for SerialCardReader {
    async fn try_read(&mut self) -> Result<Option<CardRead>> {
        // A line may already be complete from an earlier chunk
        if let Some(read) = self.framer.next_read()? {
            return Ok(Some(read));
        }

        let port = self.port_mut()?;
        let available = port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(None);
        }

        let mut chunk = [0u8; READ_CHUNK];
        let wanted = available.min(READ_CHUNK);
        let received = match port.read(&mut chunk[..wanted]) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::TimedOut => 0,
            Err(e) => return Err(e.into()),
        };

        debug!(bytes = received, "Serial data received");
        self.framer.extend(&chunk[..received]);
        self.framer.next_read()
    }

    async fn reader_info(&self) -> Result<ReaderInfo> {
        Ok(ReaderInfo::new(
            "USB Serial Card Reader",
            format!("{} @ {}", self.config.port_path, self.config.baud_rate),
            ReaderMode::Hardware,
        ))
    }

    async fn set_led(&mut self, color: LedColor) -> Result<()> {
        let port = self.port_mut()?;
        port.write_all(&[color.command_byte(), b'\n'])?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        let result = match self.port_mut() {
            Ok(port) => port
                .write_all(&[LedColor::Off.command_byte(), b'\n'])
                .and_then(|()| port.flush())
                .map_err(HardwareError::from),
            Err(e) => Err(e),
        };

        // Dropping the handle closes the device either way
        self.port = None;
        self.framer.buffer.clear();
        info!(port = %self.config.port_path, "Serial card reader closed");
        result
    }
}
