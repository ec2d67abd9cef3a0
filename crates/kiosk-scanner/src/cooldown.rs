//! Duplicate suppression for card reads.
//!
//! A card left on the reader keeps producing the same identifier. The
//! filter accepts it once, then discards further reads of that identifier
//! until the cooldown has elapsed. Any other identifier is accepted at once
//! and becomes the new "last" card.
//!
//! # Phases
//!
//! - `Idle`: nothing accepted yet, or the last cooldown has expired
//! - `Cooldown`: the last accepted card is still being suppressed
//!
//! There is no "processing" phase: the state is committed before the
//! directory is consulted, so a slow lookup never lets a duplicate through.
//!
//! # Examples
//!
//! ```
//! use kiosk_core::CardId;
//! use kiosk_scanner::cooldown::{Admission, CooldownFilter};
//! use std::time::Duration;
//! use tokio::time::Instant;
//!
//! let mut filter = CooldownFilter::new(Duration::from_secs(2));
//! let card = CardId::new("123").unwrap();
//! let start = Instant::now();
//!
//! assert_eq!(filter.admit(&card, start), Admission::Accepted);
//! assert!(filter.admit(&card, start + Duration::from_secs(1)).is_suppressed());
//! assert_eq!(filter.admit(&card, start + Duration::from_secs(2)), Admission::Accepted);
//! ```

use std::fmt;
use std::time::Duration;

use kiosk_core::CardId;
use tokio::time::Instant;

/// Observable phase of the scan loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPhase {
    /// Any card will be accepted.
    Idle,

    /// `card_id` is suppressed until `expires_at`.
    Cooldown { card_id: CardId, expires_at: Instant },
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::Idle => write!(f, "Idle"),
            ScanPhase::Cooldown { card_id, .. } => write!(f, "Cooldown({card_id})"),
        }
    }
}

/// Last accepted card and when it was accepted.
///
/// Mutated only by [`CooldownFilter::admit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    last_card: Option<CardId>,
    last_accepted_at: Option<Instant>,
}

impl ScanState {
    /// Identifier of the last accepted read.
    pub fn last_card(&self) -> Option<&CardId> {
        self.last_card.as_ref()
    }

    /// When the last read was accepted.
    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.last_accepted_at
    }

    /// Phase at `now` for the given cooldown.
    pub fn phase(&self, cooldown: Duration, now: Instant) -> ScanPhase {
        match (&self.last_card, self.last_accepted_at) {
            (Some(card_id), Some(accepted_at)) if now < accepted_at + cooldown => {
                ScanPhase::Cooldown {
                    card_id: card_id.clone(),
                    expires_at: accepted_at + cooldown,
                }
            }
            _ => ScanPhase::Idle,
        }
    }
}

/// Verdict of the filter on one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Forward the read to resolution.
    Accepted,

    /// Same card as last time, still inside the cooldown window.
    Suppressed { remaining: Duration },
}

impl Admission {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Admission::Suppressed { .. })
    }
}

/// Cooldown gate in front of the resolver.
#[derive(Debug, Clone)]
pub struct CooldownFilter {
    state: ScanState,
    cooldown: Duration,
}

impl CooldownFilter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: ScanState::default(),
            cooldown,
        }
    }

    /// Decide on a read of `card_id` observed at `now`.
    ///
    /// An accepted read updates the state before returning, so the caller
    /// holds the new state before it issues any remote call. Suppressed
    /// reads leave the state untouched; the window is measured from the
    /// accepted read, not from the latest duplicate.
    pub fn admit(&mut self, card_id: &CardId, now: Instant) -> Admission {
        if let (Some(last), Some(accepted_at)) =
            (&self.state.last_card, self.state.last_accepted_at)
            && last == card_id
        {
            let elapsed = now.saturating_duration_since(accepted_at);
            if elapsed < self.cooldown {
                return Admission::Suppressed {
                    remaining: self.cooldown - elapsed,
                };
            }
        }

        self.state.last_card = Some(card_id.clone());
        self.state.last_accepted_at = Some(now);
        Admission::Accepted
    }

    /// Current state.
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Configured cooldown window.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Phase at `now`.
    pub fn phase(&self, now: Instant) -> ScanPhase {
        self.state.phase(self.cooldown, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn card(id: &str) -> CardId {
        CardId::new(id).unwrap()
    }

    const COOLDOWN: Duration = Duration::from_secs(2);

    #[test]
    fn test_first_read_accepted() {
        let mut filter = CooldownFilter::new(COOLDOWN);
        let now = Instant::now();

        assert_eq!(filter.phase(now), ScanPhase::Idle);
        assert_eq!(filter.admit(&card("123"), now), Admission::Accepted);
        assert_eq!(filter.state().last_card(), Some(&card("123")));
        assert_eq!(filter.state().last_accepted_at(), Some(now));
    }

    #[rstest]
    #[case(0, false)]
    #[case(1_000, false)]
    #[case(1_999, false)]
    #[case(2_000, true)]
    #[case(3_000, true)]
    fn test_same_card_boundary(#[case] after_ms: u64, #[case] accepted: bool) {
        let mut filter = CooldownFilter::new(COOLDOWN);
        let start = Instant::now();
        filter.admit(&card("123"), start);

        let admission = filter.admit(&card("123"), start + Duration::from_millis(after_ms));
        assert_eq!(admission == Admission::Accepted, accepted);
    }

    #[test]
    fn test_suppressed_reports_remaining() {
        let mut filter = CooldownFilter::new(COOLDOWN);
        let start = Instant::now();
        filter.admit(&card("123"), start);

        assert_eq!(
            filter.admit(&card("123"), start + Duration::from_millis(500)),
            Admission::Suppressed {
                remaining: Duration::from_millis(1_500)
            }
        );
    }

    #[test]
    fn test_duplicates_do_not_extend_window() {
        let mut filter = CooldownFilter::new(COOLDOWN);
        let start = Instant::now();
        filter.admit(&card("123"), start);

        for ms in [500, 1_000, 1_500, 1_900] {
            assert!(
                filter
                    .admit(&card("123"), start + Duration::from_millis(ms))
                    .is_suppressed()
            );
        }
        assert_eq!(filter.state().last_accepted_at(), Some(start));
        assert_eq!(
            filter.admit(&card("123"), start + COOLDOWN),
            Admission::Accepted
        );
    }

    #[test]
    fn test_different_card_accepted_immediately() {
        let mut filter = CooldownFilter::new(COOLDOWN);
        let start = Instant::now();
        filter.admit(&card("123"), start);

        let later = start + Duration::from_millis(100);
        assert_eq!(filter.admit(&card("456"), later), Admission::Accepted);
        assert_eq!(filter.state().last_card(), Some(&card("456")));

        // Only the last card is remembered
        assert_eq!(
            filter.admit(&card("123"), later + Duration::from_millis(100)),
            Admission::Accepted
        );
    }

    #[test]
    fn test_phase_tracks_cooldown() {
        let mut filter = CooldownFilter::new(COOLDOWN);
        let start = Instant::now();
        filter.admit(&card("123"), start);

        assert_eq!(
            filter.phase(start + Duration::from_secs(1)),
            ScanPhase::Cooldown {
                card_id: card("123"),
                expires_at: start + COOLDOWN
            }
        );
        assert_eq!(filter.phase(start + COOLDOWN), ScanPhase::Idle);
        assert_eq!(filter.phase(start).to_string(), "Cooldown(123)");
    }

    #[test]
    fn test_zero_cooldown_accepts_everything() {
        let mut filter = CooldownFilter::new(Duration::ZERO);
        let now = Instant::now();

        assert_eq!(filter.admit(&card("123"), now), Admission::Accepted);
        assert_eq!(filter.admit(&card("123"), now), Admission::Accepted);
    }
}
