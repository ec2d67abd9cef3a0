//! Common types shared across card reader implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HardwareError;

/// Which reader implementation the service should construct.
///
/// Chosen by configuration at startup rather than by probing for hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderMode {
    /// Serial-attached physical reader.
    #[default]
    Hardware,

    /// Channel-driven reader with no physical device.
    Simulated,
}

impl fmt::Display for ReaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardware => write!(f, "hardware"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

impl FromStr for ReaderMode {
    type Err = HardwareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hardware" | "serial" => Ok(Self::Hardware),
            "simulated" | "simulation" | "disabled" => Ok(Self::Simulated),
            other => Err(HardwareError::invalid_data(format!(
                "Unknown reader mode: {other}"
            ))),
        }
    }
}

/// Card reader information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "USB Serial Reader").
    pub name: String,

    /// How the reader is attached (e.g., "/dev/ttyUSB0 @ 9600").
    pub link: String,

    /// Which implementation is behind the reader.
    pub mode: ReaderMode,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, link: impl Into<String>, mode: ReaderMode) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            mode,
        }
    }
}

/// LED colors used as the local success/failure indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LedColor {
    /// LED off.
    Off,

    /// Red LED (card not recognised).
    Red,

    /// Green LED (card recognised).
    Green,
}

impl LedColor {
    /// Single-byte command understood by serial readers with a status LED.
    pub fn command_byte(&self) -> u8 {
        match self {
            Self::Off => b'0',
            Self::Red => b'R',
            Self::Green => b'G',
        }
    }
}
