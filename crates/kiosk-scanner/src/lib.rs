//! Card scan loop for the kiosk service.
//!
//! Turns a stream of raw reader output into a deduplicated sequence of
//! authentication attempts, each resolved against the user directory and
//! appended to the audit log.
//!
//! - [`CooldownFilter`] suppresses repeated reads of the card on the reader
//! - [`AttemptResolver`] performs the bounded lookup and append
//! - [`ScanCoordinator`] drives both from the reader poll loop
//!
//! Remote failures never stop the loop; they are logged and the attempt is
//! recorded as failed.

pub mod config;
pub mod cooldown;
pub mod coordinator;
pub mod error;
pub mod resolver;

pub use config::ScanConfig;
pub use cooldown::{Admission, CooldownFilter, ScanPhase, ScanState};
pub use coordinator::{ScanCoordinator, ScanStats, TickOutcome};
pub use error::{ScanError, ScanResult};
pub use resolver::{AttemptResolver, ScanOutcome, UnresolvedCause};
