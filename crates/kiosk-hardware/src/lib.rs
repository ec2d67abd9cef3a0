//! Card reader abstraction layer for the kiosk scan service.
//!
//! This crate provides the trait-based abstraction the scan loop polls,
//! together with the two reader implementations the service can run with:
//!
//! - [`SerialCardReader`]: a physical reader attached through a serial
//!   port, printing one card per line.
//! - [`SimulatedReader`]: a reader with no device behind it, either
//!   permanently empty or driven from a [`SimulatedReaderHandle`].
//!
//! # Design Philosophy
//!
//! - **Non-blocking**: [`CardReader::try_read`] returns immediately; "no
//!   card" is `Ok(None)`, never an error.
//! - **Async-first**: native `async fn` in traits (Edition 2024 RPITIT).
//! - **Enum dispatch**: [`AnyCardReader`] selects the implementation at
//!   startup from configuration, since async traits are not object-safe.
//! - **Degrade, don't die**: a hardware reader that cannot be opened turns
//!   into a disabled simulated reader.
//!
//! # Example
//!
//! ```no_run
//! use kiosk_hardware::{AnyCardReader, CardReader, ReaderMode, SerialReaderConfig};
//!
//! #[tokio::main]
//! async fn main() -> kiosk_hardware::Result<()> {
//!     let config = SerialReaderConfig::new("/dev/ttyUSB0").baud_rate(9600);
//!     let mut reader = AnyCardReader::open(ReaderMode::Hardware, &config);
//!
//!     if let Some(read) = reader.try_read().await? {
//!         println!("card {}", read.identifier);
//!     }
//!
//!     reader.shutdown().await
//! }
//! ```

pub mod devices;
pub mod error;
pub mod serial;
pub mod simulated;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::AnyCardReader;
pub use error::{HardwareError, Result};
pub use serial::{LineFramer, SerialCardReader, SerialReaderConfig};
pub use simulated::{SimulatedReader, SimulatedReaderHandle};
pub use traits::{CardRead, CardReadBuilder, CardReader};
pub use types::{LedColor, ReaderInfo, ReaderMode};
