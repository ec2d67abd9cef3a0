//! Shared test doubles for the scan loop integration tests.
//!
//! Directories and audit logs are cheap to clone; clones share state so a
//! test can keep one handle while the coordinator owns another.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kiosk_core::{AuthenticationEvent, CardId, UserRecord};
use kiosk_directory::{AuthLogRepository, CardLookup, DirectoryError, DirectoryResult};
use kiosk_hardware::{SimulatedReader, SimulatedReaderHandle};
use kiosk_scanner::{ScanConfig, ScanCoordinator};
use tokio::sync::Notify;

pub fn card(id: &str) -> CardId {
    CardId::new(id).unwrap()
}

pub fn user(id: &str, name: &str, card_id: &str) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: name.to_string(),
        card_id: card(card_id),
        balance: 0.0,
        contact_number: String::new(),
        created_at: None,
    }
}

/// Directory with Alice on card 123 and Bob on card 456.
pub fn sample_directory() -> InMemoryDirectory {
    InMemoryDirectory::new([user("u1", "Alice", "123"), user("u2", "Bob", "456")])
}

/// Coordinator over a simulated reader with default timings.
pub fn coordinator<D, L>(
    directory: D,
    audit_log: L,
) -> (ScanCoordinator<SimulatedReader, D, L>, SimulatedReaderHandle)
where
    D: CardLookup,
    L: AuthLogRepository,
{
    let (reader, handle) = SimulatedReader::new();
    let scanner = ScanCoordinator::new(reader, directory, audit_log, ScanConfig::default());
    (scanner, handle)
}

// ============================================================================
// Directories
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: Arc<HashMap<CardId, UserRecord>>,
    lookups: Arc<Mutex<Vec<CardId>>>,
}

impl InMemoryDirectory {
    pub fn new(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: Arc::new(
                users
                    .into_iter()
                    .map(|u| (u.card_id.clone(), u))
                    .collect(),
            ),
            lookups: Arc::default(),
        }
    }

    pub fn lookups(&self) -> Vec<CardId> {
        self.lookups.lock().unwrap().clone()
    }
}

impl CardLookup for InMemoryDirectory {
    async fn find_by_card_id(&self, card_id: &CardId) -> DirectoryResult<Option<UserRecord>> {
        self.lookups.lock().unwrap().push(card_id.clone());
        Ok(self.users.get(card_id).cloned())
    }
}

/// Directory that is always unreachable.
#[derive(Debug, Clone, Default)]
pub struct FailingDirectory {
    calls: Arc<AtomicUsize>,
}

impl FailingDirectory {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CardLookup for FailingDirectory {
    async fn find_by_card_id(&self, _card_id: &CardId) -> DirectoryResult<Option<UserRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DirectoryError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// Directory whose lookups panic, for teardown on abnormal exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanickingDirectory;

impl CardLookup for PanickingDirectory {
    async fn find_by_card_id(&self, card_id: &CardId) -> DirectoryResult<Option<UserRecord>> {
        panic!("lookup of {card_id} blew up");
    }
}

/// Directory whose lookups wait for [`StallingDirectory::release`].
#[derive(Debug, Clone, Default)]
pub struct StallingDirectory {
    gate: Arc<Notify>,
    calls: Arc<AtomicUsize>,
    inner: InMemoryDirectory,
}

impl StallingDirectory {
    pub fn new(inner: InMemoryDirectory) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CardLookup for StallingDirectory {
    async fn find_by_card_id(&self, card_id: &CardId) -> DirectoryResult<Option<UserRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        self.inner.find_by_card_id(card_id).await
    }
}

// ============================================================================
// Audit logs
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct RecordingAuthLog {
    events: Arc<Mutex<Vec<AuthenticationEvent>>>,
}

impl RecordingAuthLog {
    pub fn events(&self) -> Vec<AuthenticationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl AuthLogRepository for RecordingAuthLog {
    async fn append(&self, event: &AuthenticationEvent) -> DirectoryResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Audit log that rejects every append.
#[derive(Debug, Clone, Default)]
pub struct FailingAuthLog {
    attempts: Arc<AtomicUsize>,
}

impl FailingAuthLog {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AuthLogRepository for FailingAuthLog {
    async fn append(&self, _event: &AuthenticationEvent) -> DirectoryResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DirectoryError::Status {
            status: 500,
            body: "insert failed".to_string(),
        })
    }
}

/// Audit log whose appends take `delay` before succeeding.
#[derive(Debug, Clone)]
pub struct SlowAuthLog {
    delay: Duration,
    inner: RecordingAuthLog,
}

impl SlowAuthLog {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: RecordingAuthLog::default(),
        }
    }

    pub fn events(&self) -> Vec<AuthenticationEvent> {
        self.inner.events()
    }
}

impl AuthLogRepository for SlowAuthLog {
    async fn append(&self, event: &AuthenticationEvent) -> DirectoryResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.append(event).await
    }
}
