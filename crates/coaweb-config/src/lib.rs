//! Configuration management for coaweb
//!
//! This module handles loading, validation, and management of
//! coaweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigErrorSeverity};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow cross-origin requests from browser frontends
    #[serde(default = "default_true")]
    pub cors_enable: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enable: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// A business entity whose chart of accounts is tracked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity identifier used in URLs (e.g., "pt-maju")
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Account snapshot file, relative to the data path.
    /// Defaults to `<id>.json`.
    #[serde(default)]
    pub accounts_file: Option<String>,
    /// Budget file, relative to the data path.
    /// Defaults to `<id>.budget.json` when present.
    #[serde(default)]
    pub budget_file: Option<String>,
}

impl EntityConfig {
    /// Account snapshot file name
    pub fn accounts_file(&self) -> String {
        self.accounts_file
            .clone()
            .unwrap_or_else(|| format!("{}.json", self.id))
    }

    /// Budget file name
    pub fn budget_file(&self) -> String {
        self.budget_file
            .clone()
            .unwrap_or_else(|| format!("{}.budget.json", self.id))
    }

    /// Name shown to users, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the snapshot directory
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Entities to load on startup
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    /// Load all entities when the server starts
    #[serde(default = "default_true")]
    pub load_on_start: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            entities: Vec::new(),
            load_on_start: true,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Default currency
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
        }
    }
}

fn default_currency() -> String {
    "IDR".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ".".to_string()
}

fn default_decimal_sep() -> String {
    ",".to_string()
}

/// Account tree view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Include suspended accounts in tree rows
    #[serde(default = "default_true")]
    pub show_suspended: bool,
    /// Session name used when a request does not carry one
    #[serde(default = "default_session")]
    pub default_session: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            show_suspended: true,
            default_session: default_session(),
        }
    }
}

fn default_session() -> String {
    "default".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Tree view settings
    #[serde(default)]
    pub view: ViewConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::IoError)?;

        let config = Self::from_yaml(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a YAML string without validating it
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if self.currency.thousands_separator == self.currency.decimal_separator {
            return Err(ConfigError::InvalidValue {
                field: "currency.thousands_separator".to_string(),
                reason: "Thousands and decimal separators must differ".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for entity in &self.data.entities {
            if entity.id.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "data.entities[].id".to_string(),
                });
            }
            if !seen.insert(entity.id.as_str()) {
                return Err(ConfigError::ValidationError {
                    message: format!("Duplicate entity id: {}", entity.id),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Look up an entity by id
    pub fn entity(&self, id: &str) -> Option<&EntityConfig> {
        self.data.entities.iter().find(|e| e.id == id)
    }

    /// Full path of an entity's account snapshot
    pub fn accounts_path(&self, entity: &EntityConfig) -> PathBuf {
        self.data.path.join(entity.accounts_file())
    }

    /// Full path of an entity's budget file
    pub fn budget_path(&self, entity: &EntityConfig) -> PathBuf {
        self.data.path.join(entity.budget_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigErrorCode;

    #[test]
    fn test_default_template_parses_and_validates() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8081);
        assert!(!config.data.entities.is_empty());
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = Config::from_yaml("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.currency.default_currency, "IDR");
        assert_eq!(config.currency.decimal_places, 2);
        assert_eq!(config.view.default_session, "default");
        assert_eq!(config.logging.level, "info");
        assert!(config.data.entities.is_empty());
    }

    #[test]
    fn test_entity_file_defaults() {
        let config = Config::from_yaml(
            "data:\n  path: /srv/coa\n  entities:\n    - id: pt-maju\n      name: PT Maju\n    - id: cv-jaya\n      accounts_file: jaya.csv\n",
        )
        .unwrap();

        let maju = config.entity("pt-maju").unwrap();
        assert_eq!(maju.accounts_file(), "pt-maju.json");
        assert_eq!(maju.budget_file(), "pt-maju.budget.json");
        assert_eq!(maju.display_name(), "PT Maju");
        assert_eq!(config.accounts_path(maju), PathBuf::from("/srv/coa/pt-maju.json"));

        let jaya = config.entity("cv-jaya").unwrap();
        assert_eq!(jaya.accounts_file(), "jaya.csv");
        assert_eq!(jaya.display_name(), "cv-jaya");
        assert!(config.entity("missing").is_none());
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidValue);
    }

    #[test]
    fn test_validate_rejects_decimal_places() {
        let mut config = Config::default();
        config.currency.decimal_places = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_same_separators() {
        let mut config = Config::default();
        config.currency.thousands_separator = ",".to_string();
        config.currency.decimal_separator = ",".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_entities() {
        let config = Config::from_yaml(
            "data:\n  entities:\n    - id: a\n    - id: a\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::ValidationError);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::InvalidYaml);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(PathBuf::from("/definitely/not/here.yaml")).unwrap_err();
        assert_eq!(err.code(), ConfigErrorCode::FileNotFound);
    }
}
