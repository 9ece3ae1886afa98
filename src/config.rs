//! Configuration management for Trust Fingerprint.
//!
//! Rhythm constants are not configurable: both parties must use the
//! same values for their hashes to agree.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::TrustThreshold;
use crate::DEFAULT_ADAPTER_TIMEOUT_SECS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub thresholds: TrustThreshold,
    pub adapters: AdapterConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Upper bound on a single adapter call
    pub timeout_secs: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_ADAPTER_TIMEOUT_SECS,
        }
    }
}

impl AdapterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Read and validate a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Config file when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !t.min_stake.is_finite() || t.min_stake < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "thresholds.min_stake must be a non-negative number, got {}",
                t.min_stake
            )));
        }
        if !(0.0..=1.0).contains(&t.min_sentiment) {
            return Err(ConfigError::Invalid(format!(
                "thresholds.min_sentiment must be within [0, 1], got {}",
                t.min_sentiment
            )));
        }
        if self.adapters.timeout_secs == 0 {
            return Err(ConfigError::Invalid("adapters.timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.thresholds, TrustThreshold::new(1.0, 0.8));
        assert_eq!(config.adapters.timeout(), Duration::from_secs(30));
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("[thresholds]\nmin_stake = 0.5\nmin_sentiment = 0.6\n").unwrap();
        assert_eq!(config.thresholds, TrustThreshold::new(0.5, 0.6));
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_full_toml() {
        let toml = r#"
            [thresholds]
            min_stake = 2.0
            min_sentiment = 0.9

            [adapters]
            timeout_secs = 5

            [server]
            addr = "0.0.0.0:8080"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.adapters.timeout_secs, 5);
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Config::from_toml("[thresholds]\nmin_stake = -1.0\nmin_sentiment = 0.8\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[thresholds]\nmin_stake = 1.0\nmin_sentiment = 1.2\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[adapters]\ntimeout_secs = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(Config::from_toml("thresholds = ["), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\naddr = \"127.0.0.1:9999\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9999");

        let err = Config::from_file("/nonexistent/fingerprint.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
