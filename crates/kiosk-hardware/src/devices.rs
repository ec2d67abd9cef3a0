//! Enum wrapper for card reader dispatch.
//!
//! Native `async fn` in traits (RPITIT) are not object-safe, so
//! `Box<dyn CardReader>` is not an option. [`AnyCardReader`] provides
//! concrete type dispatch over the reader implementations instead, chosen at
//! startup from [`ReaderMode`].
//!
//! # Examples
//!
//! ```
//! use kiosk_hardware::devices::AnyCardReader;
//! use kiosk_hardware::serial::SerialReaderConfig;
//! use kiosk_hardware::types::ReaderMode;
//!
//! let reader = AnyCardReader::open(ReaderMode::Simulated, &SerialReaderConfig::default());
//! assert!(matches!(reader, AnyCardReader::Simulated(_)));
//! ```

use tracing::{info, warn};

use crate::serial::{SerialCardReader, SerialReaderConfig};
use crate::simulated::SimulatedReader;
use crate::traits::{CardRead, CardReader};
use crate::types::{LedColor, ReaderInfo, ReaderMode};
use crate::Result;

/// Enum wrapper for card reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCardReader {
    /// Physical reader on a serial link.
    Hardware(SerialCardReader),

    /// Simulated reader (disabled, or driven by a handle).
    Simulated(SimulatedReader),
}

impl AnyCardReader {
    /// Construct the reader selected by `mode`.
    ///
    /// A hardware reader that cannot be opened is permanently unavailable
    /// for this process; the service then runs against a disabled simulated
    /// reader instead of terminating.
    pub fn open(mode: ReaderMode, serial: &SerialReaderConfig) -> Self {
        match mode {
            ReaderMode::Hardware => match SerialCardReader::open(serial.clone()) {
                Ok(reader) => Self::Hardware(reader),
                Err(e) => {
                    warn!(
                        error = %e,
                        "Card reader unavailable, running in simulation mode"
                    );
                    Self::Simulated(SimulatedReader::disabled())
                }
            },
            ReaderMode::Simulated => {
                info!("Card reader disabled by configuration, running in simulation mode");
                Self::Simulated(SimulatedReader::disabled())
            }
        }
    }

    /// Mode of the reader actually in use.
    pub fn mode(&self) -> ReaderMode {
        match self {
            Self::Hardware(_) => ReaderMode::Hardware,
            Self::Simulated(_) => ReaderMode::Simulated,
        }
    }
}

impl CardReader for AnyCardReader {
    async fn try_read(&mut self) -> Result<Option<CardRead>> {
        match self {
            Self::Hardware(device) => device.try_read().await,
            Self::Simulated(device) => device.try_read().await,
        }
    }

    async fn reader_info(&self) -> Result<ReaderInfo> {
        match self {
            Self::Hardware(device) => device.reader_info().await,
            Self::Simulated(device) => device.reader_info().await,
        }
    }

    async fn set_led(&mut self, color: LedColor) -> Result<()> {
        match self {
            Self::Hardware(device) => device.set_led(color).await,
            Self::Simulated(device) => device.set_led(color).await,
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        match self {
            Self::Hardware(device) => device.shutdown().await,
            Self::Simulated(device) => device.shutdown().await,
        }
    }
}
