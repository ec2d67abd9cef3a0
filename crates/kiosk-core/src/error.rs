use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Card errors
    #[error("Invalid card identifier: {0}")]
    InvalidCardId(String),

    // Event errors
    #[error("Invalid event type: {0}")]
    InvalidEventType(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidConfigValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
