//! Configuration management for weightlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::controller::FormSettings;
use crate::error::{Error, Result};
use crate::ledger::{EntryFormat, COOLDOWN_HOURS, DEFAULT_DATE_FORMAT};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "weightlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "weights.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WEIGHTLOG_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/weightlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Ledger rules.
    pub ledger: LedgerConfig,
    /// History display.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/weightlog/weights.db`
    pub database_path: Option<PathBuf>,
}

/// Ledger rule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Minimum hours between two entries.
    pub cooldown_hours: u32,
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `strftime` pattern for entry dates.
    pub date_format: String,
    /// Show dates in the local time zone (UTC otherwise).
    pub use_local_time: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: COOLDOWN_HOURS,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            use_local_time: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("WEIGHTLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.ledger.cooldown_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "cooldown_hours must be greater than 0".to_string(),
            });
        }

        if self.display.date_format.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "date_format must not be empty".to_string(),
            });
        }

        if StrftimeItems::new(&self.display.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::ConfigValidation {
                message: format!("invalid date_format: {}", self.display.date_format),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the cooldown window.
    #[must_use]
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.ledger.cooldown_hours))
    }

    /// Get the entry formatting rules.
    #[must_use]
    pub fn entry_format(&self) -> EntryFormat {
        EntryFormat {
            date_format: self.display.date_format.clone(),
            local_time: self.display.use_local_time,
        }
    }

    /// Get the settings an entry form runs with.
    #[must_use]
    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            cooldown: self.cooldown(),
            entry_format: self.entry_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.ledger.cooldown_hours, 48);
        assert_eq!(config.display.date_format, DEFAULT_DATE_FORMAT);
        assert!(config.display.use_local_time);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_cooldown() {
        let mut config = Config::default();
        config.ledger.cooldown_hours = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("cooldown_hours"));
    }

    #[test]
    fn test_validate_empty_date_format() {
        let mut config = Config::default();
        config.display.date_format = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("date_format"));
    }

    #[test]
    fn test_validate_bad_date_format() {
        let mut config = Config::default();
        config.display.date_format = "%Y-%Q".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid date_format"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("weights.db"));
        assert!(path.to_string_lossy().contains("weightlog"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/weights.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/weights.sqlite")
        );
    }

    #[test]
    fn test_cooldown() {
        let mut config = Config::default();
        assert_eq!(config.cooldown(), chrono::Duration::hours(48));

        config.ledger.cooldown_hours = 24;
        assert_eq!(config.cooldown(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_form_settings() {
        let mut config = Config::default();
        config.display.use_local_time = false;

        let settings = config.form_settings();
        assert_eq!(settings.cooldown, chrono::Duration::hours(48));
        assert!(!settings.entry_format.local_time);
        assert_eq!(settings.entry_format.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("weightlog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[ledger]\ncooldown_hours = 24\n\n[display]\nuse_local_time = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.ledger.cooldown_hours, 24);
        assert!(!config.display.use_local_time);
        assert_eq!(config.display.date_format, DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ledger]\ncooldown_hours = 0\n").unwrap();

        assert!(matches!(
            Config::load_from(Some(path)),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("cooldown_hours"));
        assert!(json.contains("date_format"));
    }

    #[test]
    fn test_ledger_config_deserialize() {
        let ledger: LedgerConfig = serde_json::from_str(r#"{"cooldown_hours": 72}"#).unwrap();
        assert_eq!(ledger.cooldown_hours, 72);
    }
}
