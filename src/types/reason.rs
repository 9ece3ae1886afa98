//! Reason codes for trust verdicts
//! One code per gate of the evaluation ladder

use serde::{Deserialize, Serialize};

/// Reason disclosed with every trust verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum VerdictReason {
    // =========================================================================
    // R100: Outcome
    // =========================================================================
    /// Stake and sentiment both meet the threshold
    R100_TRUSTED,

    // =========================================================================
    // R101-R102: Existence gates (short-circuit)
    // =========================================================================
    /// Identity atom does not exist
    R101_NO_IDENTITY,
    /// Identity exists but has no claim
    R102_NO_CLAIM,

    // =========================================================================
    // R103-R104: Threshold gates
    // =========================================================================
    /// For-stake below threshold.min_stake
    R103_INSUFFICIENT_STAKE,
    /// Sentiment below threshold.min_sentiment
    R104_LOW_SENTIMENT,
}

impl VerdictReason {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R100_TRUSTED => "R100_TRUSTED",
            Self::R101_NO_IDENTITY => "R101_NO_IDENTITY",
            Self::R102_NO_CLAIM => "R102_NO_CLAIM",
            Self::R103_INSUFFICIENT_STAKE => "R103_INSUFFICIENT_STAKE",
            Self::R104_LOW_SENTIMENT => "R104_LOW_SENTIMENT",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R100_TRUSTED => "Stake and sentiment meet threshold",
            Self::R101_NO_IDENTITY => "Identity does not exist",
            Self::R102_NO_CLAIM => "No claim for identity",
            Self::R103_INSUFFICIENT_STAKE => "Stake below minimum",
            Self::R104_LOW_SENTIMENT => "Sentiment below minimum",
        }
    }

    /// Is this the trusted outcome?
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::R100_TRUSTED)
    }
}

impl std::fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
