//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::DEFAULT_LEADERBOARD_LIMIT;

/// Configuration for the hangman server.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct HangmanConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Rows returned by leaderboards when the caller gives no limit.
    #[serde(default = "default_leaderboard_limit")]
    leaderboard_limit: u32,

    /// Seed for word selection. Random when absent.
    #[serde(default)]
    rng_seed: Option<u64>,

    /// Host the HTTP transport binds to.
    #[serde(default = "default_http_host")]
    http_host: String,

    /// Port the HTTP transport binds to.
    #[serde(default = "default_http_port")]
    http_port: u16,
}

fn default_db_path() -> String {
    "hangman.db".to_string()
}

fn default_leaderboard_limit() -> u32 {
    DEFAULT_LEADERBOARD_LIMIT
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3000
}

impl Default for HangmanConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            leaderboard_limit: default_leaderboard_limit(),
            rng_seed: None,
            http_host: default_http_host(),
            http_port: default_http_port(),
        }
    }
}

impl HangmanConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(db_path = %config.db_path, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text. Missing keys take defaults.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.leaderboard_limit == 0 {
            return Err(ConfigError::new("leaderboard_limit must be positive".to_string()));
        }
        Ok(config)
    }

    /// Returns a copy using a different database path.
    pub fn with_db_path(mut self, db_path: String) -> Self {
        self.db_path = db_path;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
