//! Server configuration
//!
//! Read from a TOML file. Every section is optional; a missing file means
//! defaults throughout.

use erm_scoring::{ScoringConfig, ScoringError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid configuration in {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("invalid scoring configuration: {0}")]
    Scoring(#[from] ScoringError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub scoring: ScoringConfig,
    /// Load the demo register at startup
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".into(), cors_origins: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info,tower_http=debug".into() }
    }
}

impl AppConfig {
    /// Load from `path`. `Ok(None)` when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = Self::parse(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse { path: path.to_path_buf(), source },
            other => other,
        })?;
        Ok(Some(config))
    }

    /// Parse and validate a TOML document
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|source| ConfigError::Parse { path: PathBuf::new(), source })?;
        config.scoring.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erm_scoring::RiskScale;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.server.cors_origins.is_empty());
        assert!(!config.seed_demo_data);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::parse(
            r#"
            seed_demo_data = true

            [server]
            bind = "127.0.0.1:9000"

            [scoring.average_impact]
            scale = "raw_product"
            dimensions = ["economic", "legal"]
            "#,
        )
        .unwrap();
        assert!(config.seed_demo_data);
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.scoring.average_impact.scale, RiskScale::RawProduct);
        assert_eq!(config.scoring.average_impact.dimensions.len(), 2);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = AppConfig::parse("[server]\nport = 80\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_scoring_rejected() {
        let err = AppConfig::parse("[scoring]\ngrid_tolerance = 0.9\n").unwrap_err();
        assert!(matches!(err, ConfigError::Scoring(_)));
    }

    #[test]
    fn test_missing_file() {
        assert!(AppConfig::load("/nonexistent/erm.toml").unwrap().is_none());
    }
}
