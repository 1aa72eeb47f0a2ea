//! Configuration management for trekdesk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pricing::FestivalCalendar;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "trekdesk";

/// Smallest bcrypt cost the bcrypt crate accepts.
const MIN_BCRYPT_COST: u32 = 4;

/// Largest bcrypt cost the bcrypt crate accepts.
const MAX_BCRYPT_COST: u32 = 31;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TREKDESK_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/trekdesk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// First-run seed data.
    pub seed: SeedConfig,
    /// Booking rules.
    pub booking: BookingConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the data files.
    /// Defaults to `~/.local/share/trekdesk`
    pub data_dir: Option<PathBuf>,
}

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,
}

/// Accounts and catalog entries created on first run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed anything at all.
    pub enabled: bool,
    /// Username of the built-in administrator; this account cannot be deleted.
    pub admin_username: String,
    /// Initial administrator password.
    pub admin_password: String,
    /// Create the `tourist` demo account.
    pub sample_tourist: bool,
    /// Fill an empty trek catalog with the sample treks.
    pub sample_treks: bool,
}

/// Booking rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Trek difficulties that require a risk acknowledgement.
    pub high_risk_difficulties: Vec<String>,
    /// Festival discount windows.
    pub festivals: Vec<FestivalConfig>,
}

/// One festival discount window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FestivalConfig {
    /// Display name.
    pub name: String,
    /// First day, `MM-DD`.
    pub start: String,
    /// Last day, `MM-DD`, inclusive. May fall before `start` to wrap the year end.
    pub end: String,
    /// Percentage taken off the base price.
    pub discount_percent: f64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            sample_tourist: true,
            sample_treks: true,
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            high_risk_difficulties: vec!["Very Difficult".to_string(), "Extreme".to_string()],
            festivals: default_festivals(),
        }
    }
}

/// Default festival windows.
fn default_festivals() -> Vec<FestivalConfig> {
    vec![
        FestivalConfig {
            name: "Dashain".to_string(),
            start: "09-25".to_string(),
            end: "10-15".to_string(),
            discount_percent: 10.0,
        },
        FestivalConfig {
            name: "Tihar".to_string(),
            start: "10-20".to_string(),
            end: "11-05".to_string(),
            discount_percent: 15.0,
        },
        FestivalConfig {
            name: "Nepali New Year".to_string(),
            start: "04-10".to_string(),
            end: "04-16".to_string(),
            discount_percent: 5.0,
        },
    ]
}

impl Config {
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
            .merge(Env::prefixed("TREKDESK_").split("__"));

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
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.auth.bcrypt_cost) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "bcrypt_cost ({}) must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}",
                    self.auth.bcrypt_cost
                ),
            });
        }

        if self.seed.enabled && self.seed.admin_username.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "seed.admin_username must not be empty".to_string(),
            });
        }

        // Parsing the calendar checks dates and percentages
        FestivalCalendar::from_config(&self.booking.festivals)?;

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Festival calendar built from the booking section.
    ///
    /// # Errors
    ///
    /// Returns an error if a festival window is malformed.
    pub fn festival_calendar(&self) -> Result<FestivalCalendar> {
        FestivalCalendar::from_config(&self.booking.festivals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.seed.enabled);
        assert_eq!(config.seed.admin_username, "admin");
        assert_eq!(config.auth.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_default_booking_config() {
        let booking = BookingConfig::default();

        assert!(booking
            .high_risk_difficulties
            .contains(&"Very Difficult".to_string()));
        assert_eq!(booking.festivals.len(), 3);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_bcrypt_cost_too_low() {
        let mut config = Config::default();
        config.auth.bcrypt_cost = 2;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("bcrypt_cost"));
    }

    #[test]
    fn test_validate_empty_admin_username() {
        let mut config = Config::default();
        config.seed.admin_username = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("admin_username"));
    }

    #[test]
    fn test_validate_empty_admin_username_ignored_when_seed_disabled() {
        let mut config = Config::default();
        config.seed.enabled = false;
        config.seed.admin_username = String::new();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_festival_date() {
        let mut config = Config::default();
        config.booking.festivals[0].start = "13-40".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("Dashain"));
    }

    #[test]
    fn test_validate_bad_festival_discount() {
        let mut config = Config::default();
        config.booking.festivals[1].discount_percent = 120.0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_data_dir_default() {
        let config = Config::default();
        assert!(config.data_dir().to_string_lossy().contains("trekdesk"));
    }

    #[test]
    fn test_data_dir_custom() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/trekdesk/data"));

        assert_eq!(config.data_dir(), PathBuf::from("/srv/trekdesk/data"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("trekdesk"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
data_dir = "/tmp/trekdesk-data"

[auth]
bcrypt_cost = 5

[booking]
high_risk_difficulties = ["Extreme"]

[[booking.festivals]]
name = "Holi"
start = "03-10"
end = "03-15"
discount_percent = 8.0
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/trekdesk-data"));
        assert_eq!(config.auth.bcrypt_cost, 5);
        assert_eq!(config.booking.high_risk_difficulties, vec!["Extreme"]);
        assert_eq!(config.booking.festivals.len(), 1);
        assert_eq!(config.booking.festivals[0].name, "Holi");
        // Untouched sections keep defaults
        assert!(config.seed.enabled);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[auth]\nbcrypt_cost = 99\n").unwrap();

        assert!(Config::load_from(Some(path)).is_err());
    }

    #[test]
    fn test_festival_calendar_from_defaults() {
        let calendar = Config::default().festival_calendar().unwrap();
        assert_eq!(calendar.festivals().len(), 3);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("bcrypt_cost"));
        assert!(json.contains("high_risk_difficulties"));
    }
}
