//! Configuration management for outlay
//!
//! This module handles loading, validation, and management of
//! outlay configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataConfig {
    /// Path to the data directory
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Expense records file name
    #[serde(default = "default_expenses_file")]
    pub expenses_file: String,
    /// Monthly budget file name
    #[serde(default = "default_budget_file")]
    pub budget_file: String,
    /// Directory for CSV and report exports (relative to data path)
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_expenses_file() -> String {
    "expenses.json".to_string()
}

fn default_budget_file() -> String {
    "budget.json".to_string()
}

fn default_export_dir() -> String {
    "exports".to_string()
}

/// Search settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    /// Similarity score (0-100) a fuzzy name match must reach
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
}

fn default_fuzzy_threshold() -> u8 {
    65
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationConfig {
    /// Records per page for lists
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

fn default_records_per_page() -> usize {
    50
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
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
    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::IoError
            }
        })?;

        let config: Config = serde_yaml::from_str(&content).map_err(|err| {
            ConfigError::InvalidYaml {
                message: err.to_string(),
            }
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.search.fuzzy_threshold > 100 {
            return Err(ConfigError::InvalidValue {
                field: "search.fuzzy_threshold".to_string(),
                reason: "Threshold must be between 0 and 100".to_string(),
            });
        }

        if self.pagination.records_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Records per page must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Full path to the expense records file
    pub fn expenses_path(&self) -> PathBuf {
        self.data.path.join(&self.data.expenses_file)
    }
}

// ==================== Tests ====================
