//! Trust Evaluation Engine: five-level decision ladder
//!
//! Levels (first two short-circuit):
//! 1. Existence    - identity atom exists
//! 2. Claim        - claim triple exists
//! 3. Stake        - for-stake, bucketed for reporting
//! 4. Sentiment    - for / (for + against), 1.0 when nobody staked
//! 5. Relationship - contested flag + relationship claims, not gating
//!
//! trusted = stake >= min_stake AND sentiment >= min_sentiment

use tracing::debug;

use crate::error::FingerprintError;
use crate::types::{StakeBucket, TrustSignal, TrustThreshold, TrustVerdict, VerdictReason};

/// Stateless trust evaluator
#[derive(Debug, Default)]
pub struct TrustEvaluator;

impl TrustEvaluator {
    /// Create new evaluator
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a signal against a threshold
    ///
    /// Never fails on well-formed input. Negative or non-finite stakes and
    /// thresholds are rejected with `InvalidSignal` before any gate runs.
    pub fn evaluate(
        &self,
        signal: &TrustSignal,
        threshold: &TrustThreshold,
    ) -> Result<TrustVerdict, FingerprintError> {
        validate_signal(signal)?;
        validate_threshold(threshold)?;

        // Level 1: Existence
        if !signal.identity_exists {
            debug!(reason = VerdictReason::R101_NO_IDENTITY.code(), "trust evaluated");
            return Ok(TrustVerdict::rejected(VerdictReason::R101_NO_IDENTITY));
        }

        // Level 2: Claim
        if !signal.claim_exists {
            debug!(reason = VerdictReason::R102_NO_CLAIM.code(), "trust evaluated");
            return Ok(TrustVerdict::rejected(VerdictReason::R102_NO_CLAIM));
        }

        // Level 3: Stake
        let stake = signal.for_stake;
        let stake_bucket = StakeBucket::classify(stake);

        // Level 4: Sentiment
        let sentiment = sentiment(signal.for_stake, signal.against_stake);

        // Level 5: Relationship
        let contested = signal.against_stake > 0.0;

        let reason = if stake < threshold.min_stake {
            VerdictReason::R103_INSUFFICIENT_STAKE
        } else if sentiment < threshold.min_sentiment {
            VerdictReason::R104_LOW_SENTIMENT
        } else {
            VerdictReason::R100_TRUSTED
        };

        debug!(
            stake,
            sentiment,
            contested,
            relationships = signal.relationship_claims.len(),
            reason = reason.code(),
            "trust evaluated"
        );

        Ok(TrustVerdict {
            trusted: reason.is_trusted(),
            reason,
            stake,
            stake_bucket,
            sentiment,
            contested,
            relationships: signal.relationship_claims.clone(),
        })
    }
}

/// Convenience wrapper over `TrustEvaluator::evaluate`
pub fn evaluate_trust(
    signal: &TrustSignal,
    threshold: &TrustThreshold,
) -> Result<TrustVerdict, FingerprintError> {
    TrustEvaluator::new().evaluate(signal, threshold)
}

/// for / (for + against); 1.0 when the denominator is zero
///
/// Finite stakes whose sum overflows are rescaled by the larger one first.
pub fn sentiment(for_stake: f64, against_stake: f64) -> f64 {
    let total = for_stake + against_stake;
    if total == 0.0 {
        1.0
    } else if total.is_infinite() {
        let scale = for_stake.max(against_stake);
        let (f, a) = (for_stake / scale, against_stake / scale);
        f / (f + a)
    } else {
        for_stake / total
    }
}

fn validate_signal(signal: &TrustSignal) -> Result<(), FingerprintError> {
    check_amount("for_stake", signal.for_stake)?;
    check_amount("against_stake", signal.against_stake)?;
    for fact in &signal.relationship_claims {
        check_amount("relationship stake", fact.stake)?;
    }
    Ok(())
}

fn validate_threshold(threshold: &TrustThreshold) -> Result<(), FingerprintError> {
    check_amount("min_stake", threshold.min_stake)?;
    if !(0.0..=1.0).contains(&threshold.min_sentiment) {
        return Err(FingerprintError::InvalidSignal(format!(
            "min_sentiment must be within [0, 1], got {}",
            threshold.min_sentiment
        )));
    }
    Ok(())
}

fn check_amount(field: &str, value: f64) -> Result<(), FingerprintError> {
    if !value.is_finite() {
        return Err(FingerprintError::InvalidSignal(format!("{} is not finite", field)));
    }
    if value < 0.0 {
        return Err(FingerprintError::InvalidSignal(format!(
            "{} must be non-negative, got {}",
            field, value
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
