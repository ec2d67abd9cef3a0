//! Defaults shared by the kiosk crates.
//!
//! Durations are expressed in milliseconds so they can be used both for
//! `Duration::from_millis` and for the environment-variable overrides read
//! by the kiosk binary.
//!
//! ```
//! use kiosk_core::constants::*;
//! use std::time::Duration;
//!
//! let cooldown = Duration::from_millis(DEFAULT_COOLDOWN_MS);
//! assert_eq!(cooldown, Duration::from_secs(2));
//! assert!(DEFAULT_IDLE_POLL_MS < DEFAULT_SCAN_DELAY_MS);
//! ```

// ============================================================================
// Scan loop timing
// ============================================================================

/// Minimum time between two accepted reads of the same card.
///
/// A card left resting on the reader keeps producing reads; they are
/// discarded until this window has elapsed.
pub const DEFAULT_COOLDOWN_MS: u64 = 2_000;

/// Sleep after an empty read (or a suppressed duplicate).
pub const DEFAULT_IDLE_POLL_MS: u64 = 100;

/// Sleep after a read that was resolved and logged.
pub const DEFAULT_SCAN_DELAY_MS: u64 = 500;

/// Upper bound for a single directory lookup or audit append.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 3_000;

// ============================================================================
// Remote directory
// ============================================================================

/// Table holding user records.
pub const USERS_TABLE: &str = "users";

/// Insert-only table receiving authentication events.
pub const AUTH_LOGS_TABLE: &str = "authentication_logs";

/// Path prefix of the REST interface exposed by the directory.
pub const REST_PATH_PREFIX: &str = "rest/v1";

/// Request timeout applied by the HTTP client itself.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// Card identifiers
// ============================================================================

/// Identifier length the serial framer sizes its line buffer for.
///
/// Not a validation limit: identifiers of any length are resolved.
pub const MAX_CARD_ID_LENGTH: usize = 64;

// ============================================================================
// Serial reader
// ============================================================================

/// Default serial device for USB card readers.
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

/// Default baud rate for USB card readers.
pub const DEFAULT_SERIAL_BAUD: u32 = 9_600;
