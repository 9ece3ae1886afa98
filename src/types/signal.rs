//! Signal structures read from the external staking protocol

use serde::{Deserialize, Serialize};
use crate::{DEFAULT_MIN_SENTIMENT, DEFAULT_MIN_STAKE};

/// A relationship claim (subject, relation, object) with its support
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipFact {
    pub subject: String,
    pub relation: String,
    pub object: String,
    /// Stake backing this claim
    #[serde(default)]
    pub stake: f64,
}

impl RelationshipFact {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
        stake: f64,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
            stake,
        }
    }
}

/// Everything the evaluator knows about one identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustSignal {
    /// Identity atom exists
    pub identity_exists: bool,
    /// Associated claim triple exists
    #[serde(default)]
    pub claim_exists: bool,
    /// Total stake for the claim
    #[serde(default)]
    pub for_stake: f64,
    /// Total stake against the claim
    #[serde(default)]
    pub against_stake: f64,
    /// Relationship claims involving the identity
    #[serde(default)]
    pub relationship_claims: Vec<RelationshipFact>,
}

impl TrustSignal {
    /// Signal for an identity the protocol has never seen
    pub fn unknown_identity() -> Self {
        Self {
            identity_exists: false,
            claim_exists: false,
            for_stake: 0.0,
            against_stake: 0.0,
            relationship_claims: Vec::new(),
        }
    }

    /// Signal for an existing identity and claim with the given stakes
    pub fn staked(for_stake: f64, against_stake: f64) -> Self {
        Self {
            identity_exists: true,
            claim_exists: true,
            for_stake,
            against_stake,
            relationship_claims: Vec::new(),
        }
    }

    pub fn with_relationship(mut self, fact: RelationshipFact) -> Self {
        self.relationship_claims.push(fact);
        self
    }
}

/// Caller policy applied on top of the computed stake and sentiment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustThreshold {
    pub min_stake: f64,
    pub min_sentiment: f64,
}

impl Default for TrustThreshold {
    fn default() -> Self {
        Self {
            min_stake: DEFAULT_MIN_STAKE,
            min_sentiment: DEFAULT_MIN_SENTIMENT,
        }
    }
}

impl TrustThreshold {
    pub fn new(min_stake: f64, min_sentiment: f64) -> Self {
        Self { min_stake, min_sentiment }
    }
}
