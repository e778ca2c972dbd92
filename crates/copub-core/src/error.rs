//! Error types for copub-core

use thiserror::Error;

#[cfg(feature = "native")]
use crate::http::HttpError;

/// Result type alias for copub operations
pub type Result<T> = std::result::Result<T, CopubError>;

/// Main error type for copub operations
#[derive(Error, Debug)]
pub enum CopubError {
    /// Persistence-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Bibliographic source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Errors raised by a bibliographic source
#[derive(Error, Debug)]
pub enum SourceError {
    #[cfg(feature = "native")]
    #[error("HTTP error: {0}")]
    Http(HttpError),

    /// The payload could not be parsed; retrying will not help
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl SourceError {
    /// Whether a retry of the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "native")]
            SourceError::Http(e) => match e {
                HttpError::Timeout | HttpError::RequestFailed { .. } => true,
                HttpError::Status { status } => *status >= 500,
                _ => false,
            },
            SourceError::RateLimited => true,
            SourceError::Parse(_) | SourceError::InvalidQuery(_) => false,
        }
    }
}

#[cfg(feature = "native")]
impl From<HttpError> for SourceError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::RateLimited => SourceError::RateLimited,
            other => SourceError::Http(other),
        }
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(e: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML parse error: {}", e))
    }
}

/// Persistence-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The professor roster could not be loaded; nothing can be attributed without it
    #[error("Professor roster unavailable at {path}: {message}")]
    RosterUnavailable { path: String, message: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::Csv(err.to_string())
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Required field is missing
    #[error("Missing field: {0}")]
    MissingField(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
