//! The scan loop.
//!
//! [`ScanCoordinator`] owns the reader, the cooldown filter and the
//! resolver. Each [`tick`](ScanCoordinator::tick) performs one poll of the
//! reader and reports what happened; [`run`](ScanCoordinator::run) repeats
//! ticks until cancelled and then releases the reader.
//!
//! # Flow per tick
//!
//! 1. Poll the reader. No card → `Idle`.
//! 2. Trim the identifier. A blank read is an error; anything else goes on.
//! 3. Same card as the last accepted one, inside the cooldown → `Suppressed`.
//! 4. Otherwise commit the new state, resolve against the directory, append
//!    the event and signal the result on the reader LED → `Processed`.
//!
//! After `Idle` and `Suppressed` the loop sleeps the idle poll interval;
//! after `Processed` it sleeps the post-scan delay.

use std::panic::{AssertUnwindSafe, resume_unwind};
use std::time::Duration;

use futures::FutureExt;
use kiosk_directory::{AuthLogRepository, CardLookup};
use kiosk_hardware::{CardReader, LedColor};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::cooldown::{Admission, CooldownFilter, ScanPhase, ScanState};
use crate::error::ScanResult;
use crate::resolver::{AttemptResolver, ScanOutcome};

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No card on the reader.
    Idle,

    /// Duplicate read discarded without any remote call.
    Suppressed,

    /// Read accepted, resolved and logged.
    Processed(ScanOutcome),
}

impl TickOutcome {
    /// Sleep before the next tick.
    pub fn delay(&self, config: &ScanConfig) -> Duration {
        match self {
            TickOutcome::Idle | TickOutcome::Suppressed => config.idle_poll_interval,
            TickOutcome::Processed(_) => config.post_scan_delay,
        }
    }
}

/// Counters over the lifetime of a coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub accepted: u64,
    pub suppressed: u64,
    pub resolved: u64,
    pub unresolved: u64,
    pub unrecorded: u64,
    pub errors: u64,
}

/// Card scan state machine.
///
/// # Examples
///
/// ```
/// use kiosk_directory::{AuthLogRepository, CardLookup, DirectoryResult};
/// use kiosk_core::{AuthenticationEvent, CardId, UserRecord};
/// use kiosk_hardware::SimulatedReader;
/// use kiosk_scanner::{ScanConfig, ScanCoordinator, TickOutcome};
///
/// struct NobodyHome;
///
/// impl CardLookup for NobodyHome {
///     async fn find_by_card_id(&self, _: &CardId) -> DirectoryResult<Option<UserRecord>> {
///         Ok(None)
///     }
/// }
///
/// impl AuthLogRepository for NobodyHome {
///     async fn append(&self, _: &AuthenticationEvent) -> DirectoryResult<()> {
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (reader, handle) = SimulatedReader::new();
///     let mut scanner =
///         ScanCoordinator::new(reader, NobodyHome, NobodyHome, ScanConfig::default());
///
///     assert_eq!(scanner.tick().await.unwrap(), TickOutcome::Idle);
///
///     handle.present("999").await.unwrap();
///     match scanner.tick().await.unwrap() {
///         TickOutcome::Processed(outcome) => assert!(!outcome.is_resolved()),
///         other => panic!("unexpected {other:?}"),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct ScanCoordinator<R, D, L> {
    reader: R,
    filter: CooldownFilter,
    resolver: AttemptResolver<D, L>,
    config: ScanConfig,
    stats: ScanStats,
}

impl<R, D, L> ScanCoordinator<R, D, L>
where
    R: CardReader,
    D: CardLookup,
    L: AuthLogRepository,
{
    pub fn new(reader: R, directory: D, audit_log: L, config: ScanConfig) -> Self {
        Self {
            reader,
            filter: CooldownFilter::new(config.cooldown),
            resolver: AttemptResolver::new(directory, audit_log, config.remote_timeout),
            config,
            stats: ScanStats::default(),
        }
    }

    /// Run one iteration of the loop without sleeping.
    ///
    /// # Errors
    ///
    /// Returns an error for a reader fault or a blank identifier. The state
    /// is left untouched in both cases.
    pub async fn tick(&mut self) -> ScanResult<TickOutcome> {
        let read = match self.reader.try_read().await {
            Ok(Some(read)) => read,
            Ok(None) => return Ok(TickOutcome::Idle),
            Err(e) => {
                self.stats.errors += 1;
                return Err(e.into());
            }
        };

        let card_id = match read.card_id() {
            Ok(card_id) => card_id,
            Err(e) => {
                self.stats.errors += 1;
                return Err(e.into());
            }
        };

        if let Admission::Suppressed { remaining } = self.filter.admit(&card_id, Instant::now()) {
            self.stats.suppressed += 1;
            debug!(
                card_id = %card_id,
                remaining_ms = remaining.as_millis() as u64,
                "Duplicate read suppressed"
            );
            return Ok(TickOutcome::Suppressed);
        }

        self.stats.accepted += 1;
        info!(
            card_id = %card_id,
            payload = read.payload.as_deref().unwrap_or(""),
            "Card scanned"
        );

        let outcome = self.resolver.resolve(card_id, read.observed_at).await;
        self.record_stats(&outcome);
        self.indicate(&outcome).await;

        Ok(TickOutcome::Processed(outcome))
    }

    /// Poll until `shutdown` is cancelled, then release the reader.
    ///
    /// Cancellation is observed between ticks and during the sleep, never
    /// in the middle of a remote call. The reader is shut down when the loop
    /// ends, including when a tick panics; the panic is resumed afterwards.
    /// If the returned future is dropped instead, the coordinator still owns
    /// the reader and [`shutdown`](Self::shutdown) can be called directly.
    pub async fn run(&mut self, shutdown: CancellationToken) -> ScanStats {
        match self.reader.reader_info().await {
            Ok(info) => info!(
                reader = %info.name,
                link = %info.link,
                mode = %info.mode,
                cooldown_ms = self.config.cooldown.as_millis() as u64,
                "Scan loop started"
            ),
            Err(e) => warn!(error = %e, "Scan loop started, reader info unavailable"),
        }

        let looped = AssertUnwindSafe(self.poll_until_cancelled(&shutdown))
            .catch_unwind()
            .await;

        info!("Scan loop stopping");
        self.shutdown().await;

        if let Err(panic) = looped {
            resume_unwind(panic);
        }
        self.stats
    }

    async fn poll_until_cancelled(&mut self, shutdown: &CancellationToken) {
        while !shutdown.is_cancelled() {
            let delay = match self.tick().await {
                Ok(outcome) => outcome.delay(&self.config),
                Err(e) => {
                    warn!(error = %e, "Scan iteration failed");
                    self.config.idle_poll_interval
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(delay) => {}
            }
        }
    }

    /// Release the reader. Errors are logged, not returned.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.reader.shutdown().await {
            warn!(error = %e, "Reader shutdown reported an error");
        }

        info!(
            accepted = self.stats.accepted,
            suppressed = self.stats.suppressed,
            resolved = self.stats.resolved,
            unresolved = self.stats.unresolved,
            unrecorded = self.stats.unrecorded,
            errors = self.stats.errors,
            "Scan loop stopped"
        );
    }

    fn record_stats(&mut self, outcome: &ScanOutcome) {
        if outcome.is_resolved() {
            self.stats.resolved += 1;
        } else {
            self.stats.unresolved += 1;
        }
        if !outcome.recorded {
            self.stats.unrecorded += 1;
        }
    }

    async fn indicate(&mut self, outcome: &ScanOutcome) {
        let color = match &outcome.user {
            Some(user) => {
                info!(
                    card_id = %outcome.event.card_id,
                    user_id = %user.id,
                    user = %user.name,
                    recorded = outcome.recorded,
                    "Authentication successful, welcome {}",
                    user.name
                );
                LedColor::Green
            }
            None => {
                let cause = outcome
                    .unresolved
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                warn!(
                    card_id = %outcome.event.card_id,
                    cause = %cause,
                    recorded = outcome.recorded,
                    "Authentication failed"
                );
                LedColor::Red
            }
        };

        if let Err(e) = self.reader.set_led(color).await {
            debug!(error = %e, "Reader LED not updated");
        }
    }

    /// Current duplicate-suppression state.
    pub fn state(&self) -> &ScanState {
        self.filter.state()
    }

    /// Current phase.
    pub fn phase(&self) -> ScanPhase {
        self.filter.phase(Instant::now())
    }

    /// Counters so far.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn resolver(&self) -> &AttemptResolver<D, L> {
        &self.resolver
    }
}
