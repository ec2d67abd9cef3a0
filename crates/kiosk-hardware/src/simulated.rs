//! Simulated card reader.
//!
//! Used when no physical reader is configured or the configured one could
//! not be opened. A reader built with [`SimulatedReader::disabled`] never
//! produces a card; one built with [`SimulatedReader::new`] comes with a
//! handle that can present cards and inject faults programmatically.

use crate::{
    HardwareError, Result,
    traits::{CardRead, CardReader},
    types::{LedColor, ReaderInfo, ReaderMode},
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Channel-driven card reader with no physical device behind it.
///
/// # Examples
///
/// ```
/// use kiosk_hardware::simulated::SimulatedReader;
/// use kiosk_hardware::traits::CardReader;
///
/// #[tokio::main]
/// async fn main() -> kiosk_hardware::Result<()> {
///     let (mut reader, handle) = SimulatedReader::new();
///
///     assert!(reader.try_read().await?.is_none());
///
///     handle.present("123").await?;
///     let read = reader.try_read().await?.unwrap();
///     assert_eq!(read.identifier, "123");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct SimulatedReader {
    /// Channel receiver for reader events, `None` once disabled or shut down
    event_rx: Option<mpsc::Receiver<ReaderEvent>>,

    /// Device name
    name: String,

    /// Currently set LED color
    led_color: LedColor,

    /// Whether `shutdown()` has run
    shut_down: bool,
}

impl SimulatedReader {
    /// Create a simulated reader with the default name and a control handle.
    pub fn new() -> (Self, SimulatedReaderHandle) {
        Self::with_name("Simulated Card Reader")
    }

    /// Create a simulated reader with a custom name and a control handle.
    pub fn with_name(name: impl Into<String>) -> (Self, SimulatedReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);

        let reader = Self {
            event_rx: Some(event_rx),
            name: name.into(),
            led_color: LedColor::Off,
            shut_down: false,
        };

        (reader, SimulatedReaderHandle { event_tx })
    }

    /// Create a reader that never produces a card.
    pub fn disabled() -> Self {
        Self {
            event_rx: None,
            name: "Disabled Card Reader".to_string(),
            led_color: LedColor::Off,
            shut_down: false,
        }
    }

    /// Whether this reader can ever produce a card.
    pub fn is_disabled(&self) -> bool {
        self.event_rx.is_none()
    }

    /// Get the current LED color.
    pub fn led_color(&self) -> LedColor {
        self.led_color
    }

    /// Whether `shutdown()` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Default for SimulatedReader {
    fn default() -> Self {
        Self::disabled()
    }
}

impl CardReader for SimulatedReader {
    async fn try_read(&mut self) -> Result<Option<CardRead>> {
        let Some(event_rx) = self.event_rx.as_mut() else {
            return Ok(None);
        };

        match event_rx.try_recv() {
            Ok(ReaderEvent::CardPresented(read)) => Ok(Some(read)),
            Ok(ReaderEvent::Fault(message)) => Err(HardwareError::card_read(message)),
            // A dropped handle leaves nobody able to present a card
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }

    async fn reader_info(&self) -> Result<ReaderInfo> {
        let link = if self.is_disabled() { "none" } else { "channel" };
        Ok(ReaderInfo::new(
            self.name.clone(),
            link,
            ReaderMode::Simulated,
        ))
    }

    async fn set_led(&mut self, color: LedColor) -> Result<()> {
        self.led_color = color;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.event_rx = None;
        self.led_color = LedColor::Off;
        self.shut_down = true;
        Ok(())
    }
}

/// Internal event type for the simulated reader.
#[derive(Debug, Clone)]
enum ReaderEvent {
    CardPresented(CardRead),
    Fault(String),
}

/// Handle for driving a [`SimulatedReader`].
///
/// Events are delivered in the order they were sent, one per
/// `try_read()` call.
#[derive(Debug, Clone)]
pub struct SimulatedReaderHandle {
    event_tx: mpsc::Sender<ReaderEvent>,
}

impl SimulatedReaderHandle {
    /// Present a card with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present(&self, identifier: impl Into<String>) -> Result<()> {
        self.present_read(CardRead::new(identifier)).await
    }

    /// Present a card that carries a payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_with_payload(
        &self,
        identifier: impl Into<String>,
        payload: impl Into<String>,
    ) -> Result<()> {
        self.present_read(CardRead::builder(identifier).payload(payload).build())
            .await
    }

    /// Present a fully specified read.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_read(&self, read: CardRead) -> Result<()> {
        self.send(ReaderEvent::CardPresented(read)).await
    }

    /// Make the next `try_read()` fail with a card read error.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn inject_fault(&self, message: impl Into<String>) -> Result<()> {
        self.send(ReaderEvent::Fault(message.into())).await
    }

    async fn send(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected("simulated reader channel closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_reader_empty_read() {
        let (mut reader, _handle) = SimulatedReader::new();
        assert!(reader.try_read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_simulated_reader_present_in_order() {
        let (mut reader, handle) = SimulatedReader::new();

        handle.present("123").await.unwrap();
        handle.present_with_payload("456", "guest").await.unwrap();

        let first = reader.try_read().await.unwrap().unwrap();
        assert_eq!(first.identifier, "123");
        assert!(first.payload.is_none());

        let second = reader.try_read().await.unwrap().unwrap();
        assert_eq!(second.identifier, "456");
        assert_eq!(second.payload.as_deref(), Some("guest"));

        assert!(reader.try_read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_simulated_reader_fault() {
        let (mut reader, handle) = SimulatedReader::new();

        handle.inject_fault("antenna glitch").await.unwrap();
        handle.present("123").await.unwrap();

        let err = reader.try_read().await.unwrap_err();
        assert!(matches!(err, HardwareError::CardReadError { .. }));

        // The fault does not poison the reader
        let read = reader.try_read().await.unwrap().unwrap();
        assert_eq!(read.identifier, "123");
    }

    #[tokio::test]
    async fn test_disabled_reader_never_reads() {
        let mut reader = SimulatedReader::disabled();
        assert!(reader.is_disabled());

        for _ in 0..3 {
            assert!(reader.try_read().await.unwrap().is_none());
        }

        let info = reader.reader_info().await.unwrap();
        assert_eq!(info.mode, ReaderMode::Simulated);
        assert_eq!(info.link, "none");
    }

    #[tokio::test]
    async fn test_dropped_handle_reads_empty() {
        let (mut reader, handle) = SimulatedReader::new();
        drop(handle);

        assert!(reader.try_read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_led_control() {
        let (mut reader, _handle) = SimulatedReader::new();
        assert_eq!(reader.led_color(), LedColor::Off);

        reader.set_led(LedColor::Green).await.unwrap();
        assert_eq!(reader.led_color(), LedColor::Green);
    }

    #[tokio::test]
    async fn test_shutdown_releases_reader() {
        let (mut reader, handle) = SimulatedReader::new();
        reader.set_led(LedColor::Red).await.unwrap();

        reader.shutdown().await.unwrap();

        assert!(reader.is_shut_down());
        assert_eq!(reader.led_color(), LedColor::Off);
        assert!(handle.present("123").await.is_err());
        assert!(reader.try_read().await.unwrap().is_none());
    }
}
