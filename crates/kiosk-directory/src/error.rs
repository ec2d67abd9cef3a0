use thiserror::Error;

/// Directory-specific error types for the kiosk scan service.
///
/// These errors represent failures talking to the remote user directory and
/// audit log. The scan loop never propagates them; it logs the cause and
/// records the attempt as unresolved.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Request could not be sent or the response body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status
    #[error("Directory returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected row format
    #[error("Decode error: {0}")]
    Decode(String),

    /// A stored row could not be turned into a domain record
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// An insert was accepted but returned no representation
    #[error("Event was not recorded: {0}")]
    NotRecorded(String),

    /// Input rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DirectoryError {
    /// Whether the failure was the HTTP client's own request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// HTTP status of the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<kiosk_core::Error> for DirectoryError {
    fn from(err: kiosk_core::Error) -> Self {
        Self::InvalidRecord(err.to_string())
    }
}

/// Specialized result type for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = DirectoryError::Status {
            status: 503,
            body: "upstream unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Directory returned HTTP 503: upstream unavailable"
        );
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_core_error_becomes_invalid_record() {
        let core = kiosk_core::CardId::new("   ").unwrap_err();
        let err = DirectoryError::from(core);
        assert!(matches!(err, DirectoryError::InvalidRecord(_)));
        assert_eq!(err.status(), None);
    }
}
