//! Card reader trait definitions.
//!
//! The scan loop only needs one thing from a reader: "is there a card right
//! now?". [`CardReader::try_read`] answers that without waiting, so the
//! caller owns the polling cadence.
//!
//! All traits use native `async fn` methods (Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use kiosk_core::CardId;

use crate::error::Result;
use crate::types::{LedColor, ReaderInfo};

/// A single raw read from a card reader.
///
/// The identifier is kept exactly as the reader produced it; trimming and
/// validation happen when the scan loop turns it into a [`CardId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRead {
    /// Identifier text reported by the reader.
    pub identifier: String,

    /// Optional text stored on the card itself.
    pub payload: Option<String>,

    /// When the read was observed.
    pub observed_at: DateTime<Utc>,
}

impl CardRead {
    /// Create a read observed now, without payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_hardware::traits::CardRead;
    ///
    /// let read = CardRead::new(" 123 ");
    /// assert_eq!(read.card_id().unwrap().as_str(), "123");
    /// assert!(read.payload.is_none());
    /// ```
    pub fn new(identifier: impl Into<String>) -> Self {
        CardReadBuilder::new(identifier).build()
    }

    /// Create a builder for reads with payload or a fixed timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiosk_hardware::traits::CardRead;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 30, 0).unwrap();
    /// let read = CardRead::builder("123")
    ///     .payload("  member  ")
    ///     .observed_at(at)
    ///     .build();
    ///
    /// assert_eq!(read.payload.as_deref(), Some("member"));
    /// assert_eq!(read.observed_at, at);
    /// ```
    pub fn builder(identifier: impl Into<String>) -> CardReadBuilder {
        CardReadBuilder::new(identifier)
    }

    /// Trimmed, validated card identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is blank.
    pub fn card_id(&self) -> kiosk_core::Result<CardId> {
        CardId::new(&self.identifier)
    }
}

/// Builder for [`CardRead`].
#[derive(Debug, Clone)]
pub struct CardReadBuilder {
    identifier: String,
    payload: Option<String>,
    observed_at: Option<DateTime<Utc>>,
}

impl CardReadBuilder {
    /// Create a new builder for the given identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            payload: None,
            observed_at: None,
        }
    }

    /// Attach the text stored on the card. Blank payloads are dropped.
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        let payload = payload.into();
        let trimmed = payload.trim();
        self.payload = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Set a custom observation time.
    ///
    /// If not set, the current time is used when `build()` is called.
    pub fn observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    /// Build the read.
    pub fn build(self) -> CardRead {
        CardRead {
            identifier: self.identifier,
            payload: self.payload,
            observed_at: self.observed_at.unwrap_or_else(Utc::now),
        }
    }
}

/// Card reader abstraction.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or the enum wrapper
/// [`AnyCardReader`](crate::devices::AnyCardReader) when the implementation
/// is chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use kiosk_hardware::traits::CardReader;
/// use kiosk_hardware::error::Result;
/// use std::time::Duration;
///
/// async fn wait_for_card<R: CardReader>(reader: &mut R) -> Result<String> {
///     loop {
///         if let Some(read) = reader.try_read().await? {
///             return Ok(read.identifier);
///         }
///         tokio::time::sleep(Duration::from_millis(100)).await;
///     }
/// }
/// ```
pub trait CardReader: Send + Sync {
    /// Attempt to read a card without waiting.
    ///
    /// Returns `Ok(None)` when no card is present, which is the common case.
    ///
    /// # Errors
    ///
    /// Returns an error only if the link to the reader is unusable right
    /// now (disconnected, I/O failure, garbage on the line).
    async fn try_read(&mut self) -> Result<Option<CardRead>>;

    /// Get reader information.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot be queried.
    async fn reader_info(&self) -> Result<ReaderInfo>;

    /// Set the reader LED color.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has no LED or the command cannot be
    /// delivered.
    async fn set_led(&mut self, color: LedColor) -> Result<()>;

    /// Release the reader.
    ///
    /// Called once when the service stops, whatever the exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup command cannot be delivered. The
    /// reader is considered released either way.
    async fn shutdown(&mut self) -> Result<()>;
}
