//! Engine configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! domain = "shield"
//! workers = 4
//! log_filter = "cascade_vision=debug"
//! output = "json"
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core_modules::domain::Domain;
use crate::error::ConfigError;

/// How the tester prints results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub domain: Domain,
    /// Pool size; defaults to the logical CPU count.
    pub workers: usize,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub output: OutputFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            workers: num_cpus::get(),
            log_filter: "info".to_string(),
            output: OutputFormat::default(),
        }
    }
}

impl EngineConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        contents.parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must not be empty".to_string()));
        }
        Ok(())
    }
}

impl FromStr for EngineConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: EngineConfig = "".parse().expect("defaults are valid");
        assert_eq!(config.domain, Domain::Shield);
        assert_eq!(config.output, OutputFormat::Text);
        assert!(config.workers >= 1);
    }

    #[test]
    fn parses_every_field() {
        let config: EngineConfig = r#"
            domain = "face"
            workers = 3
            log_filter = "cascade_vision=debug"
            output = "json"
        "#
        .parse()
        .expect("valid config");
        assert_eq!(config.domain, Domain::Expression);
        assert_eq!(config.workers, 3);
        assert_eq!(config.log_filter, "cascade_vision=debug");
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn rejects_zero_workers() {
        let err = "workers = 0".parse::<EngineConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_domain() {
        let err = "domain = \"video\"".parse::<EngineConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load_from_file("/nonexistent/cascade.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
