//! Decoder configuration
//!
//! Loaded from an optional JSON file; every field has a default so `{}` is a
//! valid configuration.
//!
//! ```json
//! { "max_depth": 64, "log_level": "info" }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config JSON in '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        "AGGS_CONFIG_INVALID"
    }
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Decoder limits and logging threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Deepest aggregation nesting accepted before failing with DepthExceeded
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Minimum log severity ("trace", "info", "warn", "error", "fatal")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_depth() -> usize {
    64
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            log_level: default_log_level(),
        }
    }
}

impl DecoderConfig {
    /// Default configuration with a different nesting bound
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: DecoderConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be > 0".into()));
        }
        self.severity()?;
        Ok(())
    }

    /// Returns the parsed log threshold
    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown log_level '{}'", self.log_level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.severity().unwrap(), Severity::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("esaggs.json");
        fs::write(&path, "{}").unwrap();
        assert_eq!(DecoderConfig::load(&path).unwrap(), DecoderConfig::default());
    }

    #[test]
    fn test_load_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("esaggs.json");
        fs::write(&path, r#"{ "max_depth": 8, "log_level": "trace" }"#).unwrap();
        let config = DecoderConfig::load(&path).unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.severity().unwrap(), Severity::Trace);
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(matches!(
            DecoderConfig::with_max_depth(0).validate(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let config = DecoderConfig {
            log_level: "chatty".into(),
            ..DecoderConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = DecoderConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("esaggs.json");
        fs::write(&path, "{ max_depth: }").unwrap();
        assert!(matches!(DecoderConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
