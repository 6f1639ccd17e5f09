//! Store configuration
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! base_path = "./data"
//! collection = "records"
//! format = "yaml"
//! ```

use crate::document::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_collection() -> String {
    "records".to_string()
}

/// Error loading a store configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    #[error("Invalid config: {0}")]
    Parse(String),
}

/// Where and how documents are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory for the file system backend
    pub base_path: PathBuf,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub format: DocumentFormat,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            collection: default_collection(),
            format: DocumentFormat::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
