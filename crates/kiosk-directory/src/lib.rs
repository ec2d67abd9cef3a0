//! Remote user directory and audit log for the kiosk scan service.
//!
//! This crate talks to a PostgREST-style endpoint (for instance a Supabase
//! project) holding two tables: `users`, keyed by card identifier, and the
//! append-only `authentication_logs`.
//!
//! # Architecture
//!
//! - [`RestClient`] - shared HTTP client carrying the credential headers
//! - [`CardLookup`] - the single lookup the scan loop performs
//! - [`UserRepository`] - administrative pass-throughs (create, update, ...)
//! - [`AuthLogRepository`] - appends authentication events
//!
//! Errors are reported as [`DirectoryError`]; deciding what a failure means
//! for a scan is left to the caller.
//!
//! # Examples
//!
//! ```no_run
//! use kiosk_core::CardId;
//! use kiosk_directory::{Directory, RestConfig};
//! use kiosk_directory::repositories::CardLookup;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = Directory::connect(&RestConfig::new(
//!     "https://project.supabase.co",
//!     "service-key",
//! ))?;
//!
//! let card = CardId::new("123")?;
//! match directory.users().find_by_card_id(&card).await? {
//!     Some(user) => println!("{} holds card {}", user.name, card),
//!     None => println!("card {} is not registered", card),
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{RestClient, RestConfig};
pub use error::{DirectoryError, DirectoryResult};
pub use models::{NewUser, UserUpdate};
pub use repositories::{
    AuthLogRepository, CardLookup, RestAuthLog, RestUserDirectory, UserRepository,
};

/// Both repositories over one shared client.
#[derive(Debug, Clone)]
pub struct Directory {
    users: RestUserDirectory,
    auth_logs: RestAuthLog,
}

impl Directory {
    /// Build the client and both repositories from configuration.
    ///
    /// No request is made; an unreachable directory only shows up on the
    /// first call.
    pub fn connect(config: &RestConfig) -> DirectoryResult<Self> {
        let client = RestClient::new(config)?;
        Ok(Self {
            users: RestUserDirectory::new(client.clone(), config.users_table.clone()),
            auth_logs: RestAuthLog::new(client, config.auth_logs_table.clone()),
        })
    }

    /// User directory
    pub fn users(&self) -> &RestUserDirectory {
        &self.users
    }

    /// Audit log
    pub fn auth_logs(&self) -> &RestAuthLog {
        &self.auth_logs
    }

    /// Split into owned repositories.
    pub fn into_parts(self) -> (RestUserDirectory, RestAuthLog) {
        (self.users, self.auth_logs)
    }
}
