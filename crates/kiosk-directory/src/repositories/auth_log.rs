#![allow(async_fn_in_trait)]

use kiosk_core::AuthenticationEvent;
use tracing::debug;

use crate::connection::RestClient;
use crate::error::{DirectoryError, DirectoryResult};
use crate::models::AuthLogRow;

/// Append-only audit log of authentication attempts.
///
/// Events are immutable once appended; there is no update or delete.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate.
pub trait AuthLogRepository: Send + Sync {
    /// Append one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server accepted it
    /// without returning the stored row.
    async fn append(&self, event: &AuthenticationEvent) -> DirectoryResult<()>;
}

/// REST implementation of AuthLogRepository
#[derive(Debug, Clone)]
pub struct RestAuthLog {
    client: RestClient,
    table: String,
}

impl RestAuthLog {
    /// Create an audit log over the given client and table
    pub fn new(client: RestClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

impl AuthLogRepository for RestAuthLog {
    async fn append(&self, event: &AuthenticationEvent) -> DirectoryResult<()> {
        let row = AuthLogRow::from(event);
        let stored: Vec<serde_json::Value> = self.client.insert(&self.table, &row).await?;

        if stored.is_empty() {
            return Err(DirectoryError::NotRecorded(format!(
                "{} event for {} returned no rows",
                event.event_type, event.card_id
            )));
        }

        debug!(
            card_id = %event.card_id,
            event_type = %event.event_type,
            "Authentication event stored"
        );
        Ok(())
    }
}
