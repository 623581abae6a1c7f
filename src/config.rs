//! Configuration module
//!
//! Settings live in a TOML file (`~/.config/parkit/config.toml` by default).
//! A missing file yields the defaults; a malformed one is an error.
//!
//! ```toml
//! [database]
//! url = "sqlite://./parkit.db?mode=rwc"
//!
//! [logging]
//! level = "info"
//! format = "text"
//!
//! [fare.rates]
//! CAR = "1.5"
//! BIKE = "1.0"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::fare::{DEFAULT_BIKE_RATE_PER_HOUR, DEFAULT_CAR_RATE_PER_HOUR};
use crate::domain::{FareSchedule, ParkingType};
use crate::infrastructure::DatabaseConfig;
use crate::shared::errors::ConfigError;

const APP_DIR: &str = "parkit";
const CONFIG_FILE: &str = "config.toml";

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub fare: FareConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error or a full EnvFilter string)
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Hourly rates keyed by category name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FareConfig {
    pub rates: BTreeMap<String, Decimal>,
}

impl Default for FareConfig {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(ParkingType::Car.to_string(), DEFAULT_CAR_RATE_PER_HOUR);
        rates.insert(ParkingType::Bike.to_string(), DEFAULT_BIKE_RATE_PER_HOUR);
        Self { rates }
    }
}

impl FareConfig {
    /// Validated fare schedule. Unknown categories and negative rates are rejected.
    pub fn to_schedule(&self) -> Result<FareSchedule, ConfigError> {
        let mut schedule = FareSchedule::empty();
        for (name, rate) in &self.rates {
            let category: ParkingType = name
                .parse()
                .map_err(|_| ConfigError::InvalidFare(format!("unknown category {:?}", name)))?;
            if *rate < Decimal::ZERO {
                return Err(ConfigError::InvalidFare(format!(
                    "rate for {} is negative: {}",
                    category, rate
                )));
            }
            schedule = schedule.with_rate(category, *rate);
        }
        Ok(schedule)
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Write the config, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn fare_schedule(&self) -> Result<FareSchedule, ConfigError> {
        self.fare.to_schedule()
    }
}

/// `<config dir>/parkit/config.toml`, or `./config.toml` when the platform has no config dir
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.logging.level, "info");

        let schedule = cfg.fare_schedule().unwrap();
        assert_eq!(schedule.hourly_rate(ParkingType::Car).unwrap(), dec("1.5"));
        assert_eq!(schedule.hourly_rate(ParkingType::Bike).unwrap(), Decimal::ONE);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [logging]
            format = "json"

            [database]
            url = "sqlite::memory:"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.logging.format, "json");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.database.max_connections, 5);
    }

    #[test]
    fn custom_rates_replace_the_table() {
        let cfg = AppConfig::from_toml(
            r#"
            [fare.rates]
            car = "2.25"
            "#,
        )
        .unwrap();

        let schedule = cfg.fare_schedule().unwrap();
        assert_eq!(schedule.hourly_rate(ParkingType::Car).unwrap(), dec("2.25"));
        assert!(schedule.hourly_rate(ParkingType::Bike).is_err());
    }

    #[test]
    fn negative_rate_is_rejected() {
        let cfg = AppConfig::from_toml("[fare.rates]\nCAR = \"-1\"\n").unwrap();
        assert!(matches!(cfg.fare_schedule(), Err(ConfigError::InvalidFare(_))));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let cfg = AppConfig::from_toml("[fare.rates]\nTRUCK = \"3\"\n").unwrap();
        assert!(matches!(cfg.fare_schedule(), Err(ConfigError::InvalidFare(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml("[logging\nlevel = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("parkit-config-test-does-not-exist.toml");
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let path = std::env::temp_dir()
            .join(format!("parkit-config-test-{}", uuid::Uuid::new_v4()))
            .join(CONFIG_FILE);
        let mut cfg = AppConfig::default();
        cfg.logging.level = "debug".to_string();

        cfg.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded, cfg);
    }
}
