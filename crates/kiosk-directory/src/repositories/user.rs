#![allow(async_fn_in_trait)]

use kiosk_core::{CardId, UserRecord};
use tracing::{debug, warn};

use crate::connection::{RestClient, eq};
use crate::error::{DirectoryError, DirectoryResult};
use crate::models::{NewUser, UserRow, UserUpdate};

/// Card lookup used by the scan loop.
///
/// This is the only directory operation on the scan path. Keeping it apart
/// from [`UserRepository`] lets test doubles implement just the lookup.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate.
pub trait CardLookup: Send + Sync {
    /// Find the user holding `card_id`.
    ///
    /// `Ok(None)` means the directory answered and no user holds the card.
    async fn find_by_card_id(&self, card_id: &CardId) -> DirectoryResult<Option<UserRecord>>;
}

/// Administrative user operations.
///
/// These are pass-throughs to the directory and are not used by the scan
/// loop. Update and delete operations report whether any row matched.
pub trait UserRepository: CardLookup {
    /// Find a user by primary key
    async fn find_by_id(&self, id: &str) -> DirectoryResult<Option<UserRecord>>;

    /// Find the first user whose name contains `name` (case-insensitive),
    /// or whose first name equals it
    async fn find_by_name(&self, name: &str) -> DirectoryResult<Option<UserRecord>>;

    /// List all users
    async fn list(&self) -> DirectoryResult<Vec<UserRecord>>;

    /// Create a new user, returning the stored record
    async fn create(&self, user: &NewUser) -> DirectoryResult<UserRecord>;

    /// Apply a partial update to the user holding `card_id`
    async fn update(&self, card_id: &CardId, changes: &UserUpdate) -> DirectoryResult<bool>;

    /// Set the balance of the user holding `card_id`, clamped at zero
    async fn update_balance(&self, card_id: &CardId, amount: f64) -> DirectoryResult<bool>;

    /// Set the balance of the user with primary key `id`, clamped at zero
    async fn update_balance_by_id(&self, id: &str, amount: f64) -> DirectoryResult<bool>;

    /// Delete the user holding `card_id`
    async fn delete(&self, card_id: &CardId) -> DirectoryResult<bool>;
}

/// REST implementation of the user directory
#[derive(Debug, Clone)]
pub struct RestUserDirectory {
    client: RestClient,
    table: String,
}

impl RestUserDirectory {
    /// Create a directory over the given client and users table
    pub fn new(client: RestClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    async fn find_one(&self, column: &str, value: &str) -> DirectoryResult<Option<UserRecord>> {
        let rows: Vec<UserRow> = self.client.select(&self.table, &[(column, eq(value))]).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(UserRecord::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn patch(&self, column: &str, value: &str, body: &UserUpdate) -> DirectoryResult<bool> {
        let rows: Vec<serde_json::Value> = self
            .client
            .update(&self.table, &[(column, eq(value))], body)
            .await?;
        Ok(!rows.is_empty())
    }
}

impl CardLookup for RestUserDirectory {
    async fn find_by_card_id(&self, card_id: &CardId) -> DirectoryResult<Option<UserRecord>> {
        self.find_one("eid", card_id.as_str()).await
    }
}

impl UserRepository for RestUserDirectory {
    async fn find_by_id(&self, id: &str) -> DirectoryResult<Option<UserRecord>> {
        let id = id.trim();
        if id.is_empty() {
            return Err(DirectoryError::Validation("user id is empty".to_string()));
        }
        self.find_one("id", id).await
    }

    async fn find_by_name(&self, name: &str) -> DirectoryResult<Option<UserRecord>> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return Err(DirectoryError::Validation("name is empty".to_string()));
        }

        let users = self.list().await?;
        Ok(users
            .into_iter()
            .find(|user| name_matches(&query, &user.name)))
    }

    async fn list(&self) -> DirectoryResult<Vec<UserRecord>> {
        let rows: Vec<UserRow> = self.client.select(&self.table, &[]).await?;
        let total = rows.len();

        let users: Vec<UserRecord> = rows
            .into_iter()
            .filter_map(|row| match UserRecord::try_from(row) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Skipping unusable user row");
                    None
                }
            })
            .collect();

        debug!(total, usable = users.len(), "Listed users");
        Ok(users)
    }

    async fn create(&self, user: &NewUser) -> DirectoryResult<UserRecord> {
        if user.name.trim().is_empty() {
            return Err(DirectoryError::Validation("name is empty".to_string()));
        }

        let rows: Vec<UserRow> = self.client.insert(&self.table, user).await?;
        let row = rows.into_iter().next().ok_or_else(|| {
            DirectoryError::NotRecorded(format!("user with eid {} not returned", user.eid))
        })?;

        UserRecord::try_from(row)
    }

    async fn update(&self, card_id: &CardId, changes: &UserUpdate) -> DirectoryResult<bool> {
        if changes.is_empty() {
            return Err(DirectoryError::Validation(
                "update has no fields set".to_string(),
            ));
        }
        self.patch("eid", card_id.as_str(), changes).await
    }

    async fn update_balance(&self, card_id: &CardId, amount: f64) -> DirectoryResult<bool> {
        let changes = UserUpdate::new().balance(amount);
        self.patch("eid", card_id.as_str(), &changes).await
    }

    async fn update_balance_by_id(&self, id: &str, amount: f64) -> DirectoryResult<bool> {
        let changes = UserUpdate::new().balance(amount);
        self.patch("id", id.trim(), &changes).await
    }

    async fn delete(&self, card_id: &CardId) -> DirectoryResult<bool> {
        let rows: Vec<serde_json::Value> = self
            .client
            .delete(&self.table, &[("eid", eq(card_id))])
            .await?;
        Ok(!rows.is_empty())
    }
}

/// `query` must already be trimmed and lowercased.
fn name_matches(query: &str, name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains(query) || name.split_whitespace().next() == Some(query)
}
