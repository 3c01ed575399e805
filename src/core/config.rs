use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::ConfigError;
use crate::compute::distance::DistanceMetric;
use crate::storage::backends::VectorStoreBackendType;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: VectorStoreConfig,
    pub logging: LoggingConfig,
    pub batching: BatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorStoreBackendType,
    /// Collection (or table) name
    pub collection: String,
    pub dimension: usize,
    pub distance: DistanceMetric,
    /// Limit used when a search request leaves it at zero
    pub default_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub with_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingConfig {
    pub max_batch_bytes: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorStoreBackendType::default(),
            collection: "documents".to_string(),
            dimension: 384,
            distance: DistanceMetric::Cosine,
            default_limit: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
        }
    }
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_batch_bytes: 4 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded configuration from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.collection.trim().is_empty() {
            return Err(ConfigError::Invalid("store.collection must not be empty".to_string()));
        }
        if self.store.dimension == 0 {
            return Err(ConfigError::Invalid("store.dimension must be greater than zero".to_string()));
        }
        if self.batching.max_batch_bytes == 0 {
            return Err(ConfigError::Invalid(
                "batching.max_batch_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
