//! Remote call bounds and failure mapping of the attempt resolver.
//!
//! Run with: cargo test --package kiosk-scanner --test resolver

mod common;

use std::time::Duration;

use chrono::Utc;
use common::*;
use kiosk_core::AuthEventType;
use kiosk_scanner::{AttemptResolver, UnresolvedCause};
use tokio::time::Instant;

const TIMEOUT: Duration = Duration::from_secs(3);

#[tokio::test(start_paused = true)]
async fn test_resolved_card() {
    let log = RecordingAuthLog::default();
    let resolver = AttemptResolver::new(sample_directory(), log.clone(), TIMEOUT);
    let observed_at = Utc::now();

    let outcome = resolver.resolve(card("456"), observed_at).await;

    assert_eq!(outcome.user.as_ref().unwrap().name, "Bob");
    assert_eq!(outcome.event.event_type, AuthEventType::Login);
    assert_eq!(outcome.event.timestamp, observed_at);
    assert_eq!(
        outcome.event.message.as_deref(),
        Some("User Bob scanned successfully")
    );
    assert!(outcome.recorded);
    assert_eq!(log.events(), vec![outcome.event]);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_lookup_times_out() {
    let directory = StallingDirectory::new(sample_directory());
    let log = RecordingAuthLog::default();
    let resolver = AttemptResolver::new(directory.clone(), log.clone(), TIMEOUT);

    let start = Instant::now();
    let outcome = resolver.resolve(card("123"), Utc::now()).await;

    assert!(start.elapsed() >= TIMEOUT);
    assert_eq!(outcome.unresolved, Some(UnresolvedCause::LookupTimedOut));
    assert_eq!(outcome.event.event_type, AuthEventType::Failed);
    assert!(outcome.recorded);
    assert_eq!(log.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_append_times_out() {
    let log = SlowAuthLog::new(Duration::from_secs(10));
    let resolver = AttemptResolver::new(sample_directory(), log.clone(), TIMEOUT);

    let start = Instant::now();
    let outcome = resolver.resolve(card("123"), Utc::now()).await;

    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(outcome.is_resolved());
    assert!(!outcome.recorded);
    assert!(log.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_append_within_timeout_is_recorded() {
    let log = SlowAuthLog::new(Duration::from_secs(1));
    let resolver = AttemptResolver::new(sample_directory(), log.clone(), TIMEOUT);

    let outcome = resolver.resolve(card("123"), Utc::now()).await;

    assert!(outcome.recorded);
    assert_eq!(log.events().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_append_is_reported_not_raised() {
    let log = FailingAuthLog::default();
    let resolver = AttemptResolver::new(FailingDirectory::default(), log.clone(), TIMEOUT);

    let outcome = resolver.resolve(card("123"), Utc::now()).await;

    assert!(matches!(
        outcome.unresolved,
        Some(UnresolvedCause::LookupFailed(_))
    ));
    assert!(!outcome.recorded);
    assert_eq!(log.attempts(), 1);
}
