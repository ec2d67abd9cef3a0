use std::fmt;
use std::time::Duration;

use kiosk_core::constants::{
    AUTH_LOGS_TABLE, DEFAULT_HTTP_TIMEOUT_MS, REST_PATH_PREFIX, USERS_TABLE,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::{DirectoryError, DirectoryResult};

/// Connection configuration for the remote directory
#[derive(Clone)]
pub struct RestConfig {
    /// Project URL, without the REST path prefix
    pub base_url: String,

    /// Service credential sent as `apikey` and bearer token
    pub api_key: String,

    /// Request timeout enforced by the HTTP client
    pub request_timeout: Duration,

    /// Table holding user records
    pub users_table: String,

    /// Table receiving authentication events
    pub auth_logs_table: String,
}

impl fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("users_table", &self.users_table)
            .field("auth_logs_table", &self.auth_logs_table)
            .finish()
    }
}

impl RestConfig {
    /// Create a configuration for the given project URL and credential
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            users_table: USERS_TABLE.to_string(),
            auth_logs_table: AUTH_LOGS_TABLE.to_string(),
        }
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the users table name
    pub fn users_table(mut self, table: impl Into<String>) -> Self {
        self.users_table = table.into();
        self
    }

    /// Override the authentication log table name
    pub fn auth_logs_table(mut self, table: impl Into<String>) -> Self {
        self.auth_logs_table = table.into();
        self
    }
}

/// Thin PostgREST client shared by the repositories.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Build a client from configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kiosk_directory::connection::{RestClient, RestConfig};
    /// use std::time::Duration;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = RestConfig::new("https://project.supabase.co", "service-key")
    ///     .request_timeout(Duration::from_secs(5));
    ///
    /// let client = RestClient::new(&config)?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the URL or credential is blank, or if the
    /// HTTP client cannot be constructed.
    pub fn new(config: &RestConfig) -> DirectoryResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(DirectoryError::Configuration(
                "directory URL is empty".to_string(),
            ));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(DirectoryError::Configuration(format!(
                "directory URL must be http(s): {base_url}"
            )));
        }
        if config.api_key.trim().is_empty() {
            return Err(DirectoryError::Configuration(
                "directory credential is empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                DirectoryError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: config.api_key.trim().to_string(),
        })
    }

    /// Project URL the client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.base_url, REST_PATH_PREFIX, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// `GET` rows matching all `filters` (PostgREST `column=op.value` pairs).
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> DirectoryResult<Vec<T>> {
        let mut query: Vec<(&str, String)> = filters.to_vec();
        query.push(("select", "*".to_string()));

        let builder = self.request(Method::GET, table).query(&query);
        self.send(table, builder).await
    }

    /// `POST` a row, returning the stored representation.
    pub async fn insert<B, T>(&self, table: &str, body: &B) -> DirectoryResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body);
        self.send(table, builder).await
    }

    /// `PATCH` rows matching `filters`, returning the updated rows.
    pub async fn update<B, T>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: &B,
    ) -> DirectoryResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::PATCH, table)
            .query(filters)
            .header("Prefer", "return=representation")
            .json(body);
        self.send(table, builder).await
    }

    /// `DELETE` rows matching `filters`, returning the deleted rows.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> DirectoryResult<Vec<T>> {
        let builder = self
            .request(Method::DELETE, table)
            .query(filters)
            .header("Prefer", "return=representation");
        self.send(table, builder).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        table: &str,
        builder: RequestBuilder,
    ) -> DirectoryResult<Vec<T>> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(table, status = status.as_u16(), body = %body, "Directory request rejected");
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            // 204 or an empty body: PostgREST returned no representation
            return Ok(Vec::new());
        }

        let rows: Vec<T> = serde_json::from_slice(&bytes)
            .map_err(|e| DirectoryError::Decode(format!("{table}: {e}")))?;
        debug!(table, rows = rows.len(), "Directory request completed");
        Ok(rows)
    }
}

/// PostgREST equality filter value.
pub(crate) fn eq(value: impl fmt::Display) -> String {
    format!("eq.{value}")
}
