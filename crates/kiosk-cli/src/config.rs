//! Configuration assembled from the environment.
//!
//! A `.env` file in the working directory is honoured. Variables already set
//! in the environment take precedence over the file.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use kiosk_core::constants::{
    DEFAULT_COOLDOWN_MS, DEFAULT_IDLE_POLL_MS, DEFAULT_REMOTE_TIMEOUT_MS, DEFAULT_SCAN_DELAY_MS,
    DEFAULT_SERIAL_BAUD, DEFAULT_SERIAL_PORT,
};
use kiosk_core::{Error, Result};
use kiosk_directory::RestConfig;
use kiosk_hardware::{ReaderMode, SerialReaderConfig};
use kiosk_scanner::ScanConfig;

/// Output format of the stdout log layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::InvalidConfigValue {
                key: "KIOSK_LOG_FORMAT".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Logging configuration, loaded before anything else so that later
/// configuration errors are reported through it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
    /// Directory for daily-rolling JSON log files
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            dir: None,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vars = Vars(&lookup);
        Ok(Self {
            level: vars.string_or("KIOSK_LOG_LEVEL", "info"),
            format: vars.parse_or("KIOSK_LOG_FORMAT", LogFormat::default())?,
            dir: vars.optional("KIOSK_LOG_DIR").map(PathBuf::from),
        })
    }
}

/// Everything the kiosk binary needs to run
#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub directory: RestConfig,
    pub reader_mode: ReaderMode,
    pub serial: SerialReaderConfig,
    pub scan: ScanConfig,
}

impl KioskConfig {
    /// Load configuration from the process environment. Call
    /// [`load_dotenv`] first for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `MissingConfig` when the directory URL or credential is not
    /// set, and `InvalidConfigValue` for unparsable values.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vars = Vars(&lookup);

        let url = vars.required("SUPABASE_URL")?;
        let key = vars
            .optional("SUPABASE_KEY")
            .or_else(|| vars.optional("SUPABASE_SERVICE_ROLE_KEY"))
            .ok_or_else(|| Error::MissingConfig("SUPABASE_KEY".to_string()))?;

        let remote_timeout = vars.millis_or("KIOSK_REMOTE_TIMEOUT_MS", DEFAULT_REMOTE_TIMEOUT_MS)?;

        let scan = ScanConfig::new()
            .cooldown(vars.millis_or("KIOSK_COOLDOWN_MS", DEFAULT_COOLDOWN_MS)?)
            .idle_poll_interval(vars.millis_or("KIOSK_IDLE_POLL_MS", DEFAULT_IDLE_POLL_MS)?)
            .post_scan_delay(vars.millis_or("KIOSK_SCAN_DELAY_MS", DEFAULT_SCAN_DELAY_MS)?)
            .remote_timeout(remote_timeout);

        let port = vars.string_or("KIOSK_SERIAL_PORT", DEFAULT_SERIAL_PORT);
        let serial = SerialReaderConfig::new(port)
            .baud_rate(vars.parse_or("KIOSK_SERIAL_BAUD", DEFAULT_SERIAL_BAUD)?);

        let reader_mode = match vars.optional("KIOSK_READER") {
            Some(value) => value.parse().map_err(|_| Error::InvalidConfigValue {
                key: "KIOSK_READER".to_string(),
                value,
            })?,
            None => ReaderMode::default(),
        };

        Ok(Self {
            directory: RestConfig::new(url, key),
            reader_mode,
            serial,
            scan,
        })
    }
}

/// Load `.env` if present. A missing file is not an error.
pub fn load_dotenv() {
    dotenv::dotenv().ok();
}

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .ok_or_else(|| Error::MissingConfig(key.to_string()))
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.optional(key) {
            Some(value) => value.parse().map_err(|_| Error::InvalidConfigValue {
                key: key.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }

    fn millis_or(&self, key: &str, default_ms: u64) -> Result<Duration> {
        self.parse_or(key, default_ms).map(Duration::from_millis)
    }
}
