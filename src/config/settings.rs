//! Application settings loaded from config.toml.
//!
//! Scheduler cadences and the optional database URL override live in a TOML
//! file next to the binary. A missing file falls back to defaults so the
//! service starts with nothing but a `DATABASE_URL` environment variable;
//! a malformed file is a hard error.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const fn default_deactivation_check_hours() -> u64 {
    24
}

const fn default_recurring_check_minutes() -> u64 {
    1
}

const fn default_notification_check_hours() -> u64 {
    24
}

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database URL override; the `DATABASE_URL` environment variable wins
    /// over this, and a bundled `SQLite` path is the final fallback
    pub database_url: Option<String>,
    /// Hours between runs of the expired-budget deactivation sweep
    #[serde(default = "default_deactivation_check_hours")]
    pub deactivation_check_hours: u64,
    /// Minutes between runs of the recurring-contribution job
    #[serde(default = "default_recurring_check_minutes")]
    pub recurring_check_minutes: u64,
    /// Hours between runs of the notification trigger sweep
    #[serde(default = "default_notification_check_hours")]
    pub notification_check_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            deactivation_check_hours: default_deactivation_check_hours(),
            recurring_check_minutes: default_recurring_check_minutes(),
            notification_check_hours: default_notification_check_hours(),
        }
    }
}

impl AppConfig {
    /// Resolves the effective database URL: environment first, then the
    /// config file, then the bundled default path.
    #[must_use]
    pub fn resolve_database_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| self.database_url.clone())
            .unwrap_or_else(|| "sqlite://data/pocketledger.sqlite".to_string())
    }
}

/// Loads application configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from the default location (./config.toml), falling
/// back to defaults when the file does not exist.
pub fn load_default_config() -> Result<AppConfig> {
    if Path::new("config.toml").exists() {
        load_config("config.toml")
    } else {
        Ok(AppConfig::default())
    }
}
