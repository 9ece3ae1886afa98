//! Error types for fingerprinting, evaluation and configuration

use std::path::PathBuf;
use thiserror::Error;

/// Boxed source error from an external adapter
pub type AdapterSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the fingerprint and evaluation pipelines
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// Too few messages for a cross-party verifiable commitment
    #[error("Insufficient data: need at least {required} messages, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Negative stake or otherwise malformed signal
    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    /// Opaque failure from a message store or signal reader
    #[error("Adapter '{adapter}' failed: {source}")]
    AdapterFailure {
        adapter: &'static str,
        #[source]
        source: AdapterSource,
    },
}

impl FingerprintError {
    /// Wrap any adapter-side error without interpreting it
    pub fn adapter(adapter: &'static str, source: impl Into<AdapterSource>) -> Self {
        Self::AdapterFailure {
            adapter,
            source: source.into(),
        }
    }

    /// Stable kind code for reports and exit messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::InvalidSignal(_) => "INVALID_SIGNAL",
            Self::AdapterFailure { .. } => "ADAPTER_FAILURE",
        }
    }

    /// Raised by the pure stages themselves (not by an adapter)
    pub fn is_computation_error(&self) -> bool {
        !matches!(self, Self::AdapterFailure { .. })
    }
}

/// A transcript line that could not be normalised into a message record
#[derive(Debug, Error)]
#[error("Transcript line {line}: {reason}")]
pub struct TranscriptError {
    pub line: usize,
    pub reason: String,
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config (invalid TOML)")]
    Parse {
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes() {
        let err = FingerprintError::InsufficientData { required: 2, actual: 1 };
        assert_eq!(err.kind(), "INSUFFICIENT_DATA");
        assert!(err.is_computation_error());

        let err = FingerprintError::InvalidSignal("negative stake".into());
        assert_eq!(err.kind(), "INVALID_SIGNAL");

        let err = FingerprintError::adapter("memory", "connection reset");
        assert_eq!(err.kind(), "ADAPTER_FAILURE");
        assert!(!err.is_computation_error());
    }

    #[test]
    fn test_adapter_source_preserved() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "indexer timed out");
        let err = FingerprintError::adapter("graphql", io);

        assert!(err.to_string().contains("graphql"));
        assert!(err.source().unwrap().to_string().contains("indexer timed out"));
    }
}
