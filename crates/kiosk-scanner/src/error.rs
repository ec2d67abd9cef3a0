use kiosk_hardware::HardwareError;
use thiserror::Error;

/// Failure of a single scan loop iteration.
///
/// None of these stop the loop; they are logged and the next iteration
/// starts after the idle interval.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The reader link is unusable right now
    #[error("Reader fault: {0}")]
    Reader(#[from] HardwareError),

    /// The reader produced an identifier that cannot be a card
    #[error("Invalid read: {0}")]
    InvalidRead(#[from] kiosk_core::Error),
}

/// Specialized result type for scan loop iterations
pub type ScanResult<T> = Result<T, ScanError>;
