//! Trust verdict produced by the evaluation ladder

use serde::{Deserialize, Serialize};
use crate::types::{RelationshipFact, VerdictReason};
use crate::{STAKE_BUCKET_LOW, STAKE_BUCKET_MODERATE, STAKE_BUCKET_STRONG};

/// Stake size bucket (reporting only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StakeBucket {
    /// < 0.1
    Minimal,
    /// 0.1 - 1
    Low,
    /// 1 - 10
    Moderate,
    /// > 10
    Strong,
}

impl StakeBucket {
    /// Classify a for-stake amount
    pub fn classify(stake: f64) -> Self {
        if stake < STAKE_BUCKET_LOW {
            StakeBucket::Minimal
        } else if stake < STAKE_BUCKET_MODERATE {
            StakeBucket::Low
        } else if stake <= STAKE_BUCKET_STRONG {
            StakeBucket::Moderate
        } else {
            StakeBucket::Strong
        }
    }
}

impl std::fmt::Display for StakeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StakeBucket::Minimal => "MINIMAL",
            StakeBucket::Low => "LOW",
            StakeBucket::Moderate => "MODERATE",
            StakeBucket::Strong => "STRONG",
        };
        write!(f, "{}", name)
    }
}

/// Verdict for one evaluation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustVerdict {
    /// Outcome under the supplied threshold
    pub trusted: bool,
    /// First gate that decided the outcome
    pub reason: VerdictReason,
    /// For-stake (0 when a short-circuit gate fired)
    pub stake: f64,
    /// Reporting bucket for `stake`
    pub stake_bucket: StakeBucket,
    /// for / (for + against), 1.0 when nobody staked
    pub sentiment: f64,
    /// Anyone staked against the claim
    pub contested: bool,
    /// Relationship claims, surfaced but not gating
    pub relationships: Vec<RelationshipFact>,
}

impl TrustVerdict {
    /// Verdict from an existence gate: no stake was read
    ///
    /// Sentiment follows the zero-denominator convention (1.0), so a
    /// short-circuit never reads as a disputed claim.
    pub fn rejected(reason: VerdictReason) -> Self {
        Self {
            trusted: false,
            reason,
            stake: 0.0,
            stake_bucket: StakeBucket::Minimal,
            sentiment: 1.0,
            contested: false,
            relationships: Vec::new(),
        }
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "trusted={} | stake={:.4} ({}) | sentiment={:.3} | contested={} | reason={}",
            self.trusted,
            self.stake,
            self.stake_bucket,
            self.sentiment,
            self.contested,
            self.reason.code()
        )
    }
}
