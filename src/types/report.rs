//! Structured report merging both pipelines
//!
//! Field names are fixed per REPORT_VERSION; every section is optional
//! because the two pipelines run and fail independently.

use serde::{Deserialize, Serialize};
use crate::types::{ExchangeCommitment, RhythmMetrics, TrustVerdict};

/// Which pipeline an error entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    Fingerprint,
    Evaluation,
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pipeline::Fingerprint => write!(f, "fingerprint"),
            Pipeline::Evaluation => write!(f, "evaluation"),
        }
    }
}

/// Error recorded for a pipeline that aborted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportError {
    pub pipeline: Pipeline,
    /// Stable kind code (INSUFFICIENT_DATA, INVALID_SIGNAL, ADAPTER_FAILURE)
    pub kind: String,
    pub message: String,
}

/// Versioned record for CLI and attestation consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredReport {
    pub version: u32,
    pub fingerprint: Option<ExchangeCommitment>,
    pub rhythm: Option<RhythmMetrics>,
    pub verdict: Option<TrustVerdict>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ReportError>,
}

impl StructuredReport {
    /// Did any pipeline abort?
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Is there anything at all to show?
    pub fn is_empty(&self) -> bool {
        self.fingerprint.is_none() && self.rhythm.is_none() && self.verdict.is_none()
    }
}
