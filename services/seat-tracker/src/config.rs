//! Configuration types for the seat tracker service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::SeatError;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Storage backend selection with tagged enum for extensibility
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Readings live in process memory and are lost on restart
    #[default]
    Memory,
    /// Readings are persisted to a SQLite database
    Sqlite { path: PathBuf },
}

/// Path SQLite understands as a private in-memory database
pub const SQLITE_IN_MEMORY: &str = ":memory:";

impl StorageConfig {
    /// Parse a `DATABASE_URI` style connection string
    pub fn from_uri(uri: &str) -> crate::Result<Self> {
        let uri = uri.trim();
        match uri {
            "memory:" | "memory://" => return Ok(StorageConfig::Memory),
            "sqlite::memory:" | "sqlite://:memory:" => {
                return Ok(StorageConfig::Sqlite {
                    path: PathBuf::from(SQLITE_IN_MEMORY),
                })
            }
            _ => {}
        }

        let path = uri
            .strip_prefix("sqlite://")
            .or_else(|| uri.strip_prefix("sqlite:"))
            .ok_or_else(|| {
                SeatError::Config(format!("Unsupported database URI scheme: {:?}", uri))
            })?;

        if path.is_empty() {
            return Err(SeatError::Config(format!(
                "Database URI {:?} does not name a database file",
                uri
            )));
        }

        Ok(StorageConfig::Sqlite {
            path: PathBuf::from(path),
        })
    }
}

/// Which comparison decides that a seat is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyRule {
    /// Unoccupied when every sensor reads strictly above the threshold
    #[default]
    AboveThreshold,
    /// Unoccupied when every sensor reads exactly zero
    AllZero,
}

/// Occupancy classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub rule: OccupancyRule,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rule: OccupancyRule::default(),
            threshold: default_threshold(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_threshold() -> f64 {
    4.8
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SeatError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
