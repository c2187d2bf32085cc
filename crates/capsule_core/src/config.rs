//! Engine tuning knobs.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Size of the random oversampling pool drawn per sampler request
    #[serde(default = "default_sample_pool_size")]
    pub sample_pool_size: usize,

    /// Page size used when the caller does not pass one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Larger ranking page sizes are clamped to this value
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Length of the suggested-capsules list
    #[serde(default = "default_trending_limit")]
    pub trending_limit: u32,
}

fn default_sample_pool_size() -> usize {
    100
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

fn default_trending_limit() -> u32 {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_pool_size: default_sample_pool_size(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            trending_limit: default_trending_limit(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero_field = [
            ("sample_pool_size", self.sample_pool_size == 0),
            ("default_page_size", self.default_page_size == 0),
            ("max_page_size", self.max_page_size == 0),
            ("trending_limit", self.trending_limit == 0),
        ]
        .into_iter()
        .find(|(_, is_zero)| *is_zero);
        if let Some((field, _)) = zero_field {
            return Err(ConfigError::Invalid(format!("{field} must be at least 1")));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    /// Requested page size, or `default_page_size` when absent.
    pub fn page_size_or_default(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_page_size)
    }

    /// Like [`Self::page_size_or_default`], clamped to `max_page_size`.
    pub fn effective_page_size(&self, requested: Option<u32>) -> u32 {
        self.page_size_or_default(requested).min(self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = EngineConfig::from_json_str(r#"{"trending_limit": 3}"#).unwrap();
        assert_eq!(config.sample_pool_size, 100);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.trending_limit, 3);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let err = EngineConfig::from_json_str(r#"{"sample_pool_size": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("sample_pool_size")));
    }

    #[test]
    fn page_size_is_clamped() {
        let config = EngineConfig::default();
        assert_eq!(config.page_size_or_default(None), 10);
        assert_eq!(config.page_size_or_default(Some(500)), 500);
        assert_eq!(config.effective_page_size(None), 10);
        assert_eq!(config.effective_page_size(Some(500)), 100);
        assert_eq!(config.effective_page_size(Some(2)), 2);
    }

    #[test]
    fn from_path_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"max_page_size": 50, "default_page_size": 5}"#).unwrap();
        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.default_page_size, 5);
    }
}
