//! Configuration for copub-core
//!
//! Source endpoints, pacing and retry settings, and the location of the data files.
//! Every field has a default, so a config file only needs the values it changes.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `store.data_dir`
pub const DATA_DIR_ENV: &str = "COPUB_DATA_DIR";

/// Largest id batch the efetch endpoint accepts in one request
pub const MAX_BATCH_SIZE: usize = 10_000;

/// System-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopubConfig {
    /// Bibliographic source settings
    pub source: SourceConfig,
    /// Data file locations
    pub store: StoreConfig,
}

/// Bibliographic source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub esearch_url: String,
    pub efetch_url: String,
    /// Contact address sent with every request
    pub email: String,
    /// Tool name sent with every request
    pub tool: String,
    pub api_key: Option<String>,
    /// Minimum spacing between consecutive requests
    pub request_delay_ms: u64,
    /// Identifiers per fetch request
    pub batch_size: usize,
    /// Retries after a transient failure, per request
    pub max_retries: u32,
    /// Maximum identifiers returned by one search
    pub retmax: u32,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            esearch_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi".to_string(),
            efetch_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi".to_string(),
            email: String::new(),
            tool: "copub".to_string(),
            api_key: None,
            request_delay_ms: 400,
            batch_size: 200,
            max_retries: 3,
            retmax: 10_000,
            timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Data file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub professors_file: String,
    pub publications_file: String,
    pub links_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            professors_file: "professors.csv".to_string(),
            publications_file: "publications.csv".to_string(),
            links_file: "links.csv".to_string(),
        }
    }
}

impl CopubConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/copub/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("copub").join("config.toml"))
    }

    /// Load from the default path, falling back to defaults when no file exists
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading config from {:?}", path);
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(std::env::var(DATA_DIR_ENV).ok());
    }

    fn apply_overrides(&mut self, data_dir: Option<String>) {
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.store.data_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.batch_size == 0 || self.source.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::OutOfRange(format!(
                "batch_size must be between 1 and {}",
                MAX_BATCH_SIZE
            )));
        }

        if self.source.retmax == 0 {
            return Err(ConfigError::OutOfRange("retmax must be positive".to_string()));
        }

        if self.source.esearch_url.trim().is_empty() {
            return Err(ConfigError::MissingField("source.esearch_url".to_string()));
        }

        if self.source.efetch_url.trim().is_empty() {
            return Err(ConfigError::MissingField("source.efetch_url".to_string()));
        }

        if self.store.professors_file.trim().is_empty() {
            return Err(ConfigError::MissingField("store.professors_file".to_string()));
        }

        Ok(())
    }
}
