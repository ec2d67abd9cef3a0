//! Error types for card reader operations.
//!
//! Faults returned from [`CardReader::try_read`](crate::traits::CardReader::try_read)
//! are treated as transient by the scan loop. Faults returned while opening
//! a reader mean the reader is unusable for the lifetime of the process.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during card reader operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Card reading error.
    #[error("Card read error: {message}")]
    CardReadError { message: String },

    /// Serial port error.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new card read error.
    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardReadError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("/dev/ttyUSB0");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: /dev/ttyUSB0");
    }

    #[test]
    fn test_invalid_data_error() {
        let error = HardwareError::invalid_data("line too long");
        assert!(matches!(error, HardwareError::InvalidData { .. }));
        assert_eq!(error.to_string(), "Invalid data: line too long");
    }

    #[test]
    fn test_card_read_error() {
        let error = HardwareError::card_read("antenna glitch");
        assert_eq!(error.to_string(), "Card read error: antenna glitch");
    }

    #[test]
    fn test_initialization_failed_error() {
        let error = HardwareError::initialization_failed("port busy");
        assert!(matches!(error, HardwareError::InitializationFailed { .. }));
        assert_eq!(error.to_string(), "Initialization failed: port busy");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let error: HardwareError = io.into();
        assert!(matches!(error, HardwareError::Io(_)));
    }
}
