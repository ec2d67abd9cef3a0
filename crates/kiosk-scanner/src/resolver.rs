//! Resolution of accepted reads into authentication events.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kiosk_core::{AuthenticationEvent, CardId, UserRecord};
use kiosk_directory::{AuthLogRepository, CardLookup};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Why a card could not be resolved.
///
/// All causes produce the same failed event; the distinction only reaches
/// the local log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedCause {
    /// The directory answered and no user holds the card.
    NotFound,

    /// The lookup failed.
    LookupFailed(String),

    /// The lookup did not finish within the remote timeout.
    LookupTimedOut,
}

impl fmt::Display for UnresolvedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedCause::NotFound => write!(f, "not found"),
            UnresolvedCause::LookupFailed(reason) => write!(f, "lookup failed: {reason}"),
            UnresolvedCause::LookupTimedOut => write!(f, "lookup timed out"),
        }
    }
}

/// Result of resolving one accepted read.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    /// Event created for the attempt.
    pub event: AuthenticationEvent,

    /// Matched user, `None` when unresolved.
    pub user: Option<UserRecord>,

    /// Set when the card was not resolved.
    pub unresolved: Option<UnresolvedCause>,

    /// Whether the audit log confirmed the event.
    pub recorded: bool,
}

impl ScanOutcome {
    pub fn is_resolved(&self) -> bool {
        self.user.is_some()
    }
}

/// Looks up accepted cards and appends the resulting event.
///
/// Every remote call is bounded by `remote_timeout`. Failures never escape:
/// a failed lookup becomes a failed event, a failed append clears
/// [`ScanOutcome::recorded`].
#[derive(Debug)]
pub struct AttemptResolver<D, L> {
    directory: D,
    audit_log: L,
    remote_timeout: Duration,
}

impl<D, L> AttemptResolver<D, L>
where
    D: CardLookup,
    L: AuthLogRepository,
{
    pub fn new(directory: D, audit_log: L, remote_timeout: Duration) -> Self {
        Self {
            directory,
            audit_log,
            remote_timeout,
        }
    }

    /// Resolve `card_id`, observed at `observed_at`, and log the attempt.
    pub async fn resolve(&self, card_id: CardId, observed_at: DateTime<Utc>) -> ScanOutcome {
        let (user, unresolved) = match self.lookup(&card_id).await {
            Ok(user) => (Some(user), None),
            Err(cause) => (None, Some(cause)),
        };

        let event = match &user {
            Some(user) => AuthenticationEvent::login(card_id, user, observed_at),
            None => AuthenticationEvent::failed(card_id, observed_at),
        };

        let recorded = self.record(&event).await;

        ScanOutcome {
            event,
            user,
            unresolved,
            recorded,
        }
    }

    async fn lookup(&self, card_id: &CardId) -> Result<UserRecord, UnresolvedCause> {
        let result = timeout(self.remote_timeout, self.directory.find_by_card_id(card_id)).await;

        match result {
            Ok(Ok(Some(user))) => {
                debug!(card_id = %card_id, user_id = %user.id, "Card resolved");
                Ok(user)
            }
            Ok(Ok(None)) => {
                info!(card_id = %card_id, "No user found for card");
                Err(UnresolvedCause::NotFound)
            }
            Ok(Err(e)) => {
                warn!(card_id = %card_id, error = %e, "Directory lookup failed");
                Err(UnresolvedCause::LookupFailed(e.to_string()))
            }
            Err(_) => {
                warn!(
                    card_id = %card_id,
                    timeout_ms = self.remote_timeout.as_millis() as u64,
                    "Directory lookup timed out"
                );
                Err(UnresolvedCause::LookupTimedOut)
            }
        }
    }

    async fn record(&self, event: &AuthenticationEvent) -> bool {
        match timeout(self.remote_timeout, self.audit_log.append(event)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(
                    card_id = %event.card_id,
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to record authentication event"
                );
                false
            }
            Err(_) => {
                warn!(
                    card_id = %event.card_id,
                    event_type = %event.event_type,
                    timeout_ms = self.remote_timeout.as_millis() as u64,
                    "Recording authentication event timed out"
                );
                false
            }
        }
    }

    /// Directory used for lookups.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Audit log receiving events.
    pub fn audit_log(&self) -> &L {
        &self.audit_log
    }
}
