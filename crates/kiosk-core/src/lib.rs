//! Shared kiosk vocabulary: card identifiers, user records, authentication
//! events and the default timings of the scan loop.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
