//! Commitment Hash Builder
//!
//! Layered hashes over non-content metadata:
//! - commitment = SHA-256(pair ∥ 0 ∥ start_ms)[..16]
//! - rhythm_signature = SHA-256(canonical rhythm line)
//! - exchange_hash = SHA-256(commitment ∥ rhythm_signature ∥ end_ms)
//!
//! Pure and deterministic: the pair is sorted and messages are re-sorted,
//! so either party computing locally gets byte-identical hashes.

use sha2::{Sha256, Digest};
use tracing::{debug, warn};

use crate::{COMMITMENT_PREFIX_BYTES, MIN_COMMITMENT_MESSAGES};
use crate::error::FingerprintError;
use crate::core::rhythm::RhythmAnalyzer;
use crate::types::{
    CommitmentHash, ExchangeCommitment, Hash256, MessageRecord,
    ParticipantPair, RhythmMetrics, sort_by_timestamp,
};

/// Builder for exchange commitments
#[derive(Debug, Default)]
pub struct CommitmentBuilder;

impl CommitmentBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self
    }

    /// Build the three-part commitment for an exchange
    ///
    /// Fails with `InsufficientData` below 2 messages: a rhythm needs at
    /// least one response to mean anything.
    pub fn build(
        &self,
        participants: &ParticipantPair,
        messages: &[MessageRecord],
        rhythm: &RhythmMetrics,
    ) -> Result<ExchangeCommitment, FingerprintError> {
        if messages.len() < MIN_COMMITMENT_MESSAGES {
            return Err(FingerprintError::InsufficientData {
                required: MIN_COMMITMENT_MESSAGES,
                actual: messages.len(),
            });
        }

        let outsiders = messages.iter().filter(|m| !participants.covers(m)).count();
        if outsiders > 0 {
            warn!(pair = %participants, outsiders, "messages outside the participant pair");
        }

        let sorted = sort_by_timestamp(messages);
        let (period_start, period_end) = match (sorted.first(), sorted.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => {
                return Err(FingerprintError::InsufficientData {
                    required: MIN_COMMITMENT_MESSAGES,
                    actual: 0,
                })
            }
        };

        let commitment = hash_commitment(participants, period_start.timestamp_millis());
        let rhythm_signature = hash_rhythm(rhythm);
        let exchange_hash = hash_exchange(&commitment, &rhythm_signature, period_end.timestamp_millis());

        debug!(
            pair = %participants,
            messages = messages.len(),
            exchange_hash = %exchange_hash,
            "commitment built"
        );

        Ok(ExchangeCommitment {
            commitment,
            rhythm_signature,
            exchange_hash,
            participants: participants.clone(),
            period_start,
            period_end,
        })
    }

    /// Analyze and commit in one step
    pub fn fingerprint(
        &self,
        participants: &ParticipantPair,
        messages: &[MessageRecord],
    ) -> Result<(RhythmMetrics, ExchangeCommitment), FingerprintError> {
        let rhythm = RhythmAnalyzer::new().compute(messages);
        let commitment = self.build(participants, messages, &rhythm)?;
        Ok((rhythm, commitment))
    }
}

/// Convenience wrapper over `CommitmentBuilder::build`
pub fn build_commitment(
    participants: &ParticipantPair,
    messages: &[MessageRecord],
    rhythm: &RhythmMetrics,
) -> Result<ExchangeCommitment, FingerprintError> {
    CommitmentBuilder::new().build(participants, messages, rhythm)
}

/// Does the counter-party's exchange hash match ours?
pub fn verify_agreement(local: &ExchangeCommitment, remote_exchange_hash: &Hash256) -> bool {
    local.exchange_hash.ct_eq(remote_exchange_hash)
}

/// Canonical serialization of the four fingerprinted rhythm fields
///
/// Fixed field order, shortest round-trip float formatting.
pub fn canonical_rhythm(rhythm: &RhythmMetrics) -> String {
    format!(
        "avg_latency_minutes={};gap_survival_ratio={};length_variance_chars2={};temporal_consistency={}",
        rhythm.avg_latency_minutes,
        rhythm.gap_survival_ratio,
        rhythm.length_variance_chars2,
        rhythm.temporal_consistency,
    )
}

/// Step 1: anchor the sorted pair and the start time
pub fn hash_commitment(participants: &ParticipantPair, start_millis: i64) -> CommitmentHash {
    let mut hasher = Sha256::new();
    hasher.update(participants.canonical_id().as_bytes());
    hasher.update([0u8]); // Separator
    hasher.update(start_millis.to_be_bytes());

    let digest = hasher.finalize();
    let mut prefix = [0u8; COMMITMENT_PREFIX_BYTES];
    prefix.copy_from_slice(&digest[..COMMITMENT_PREFIX_BYTES]);
    CommitmentHash::from_bytes(prefix)
}

/// Step 2: content-free behavioural fingerprint
pub fn hash_rhythm(rhythm: &RhythmMetrics) -> Hash256 {
    Hash256::from_bytes(sha256(canonical_rhythm(rhythm).as_bytes()))
}

/// Step 3: final fingerprint for mutual-consent comparison
pub fn hash_exchange(commitment: &CommitmentHash, rhythm_signature: &Hash256, end_millis: i64) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update(commitment.as_bytes());
    hasher.update(rhythm_signature.as_bytes());
    hasher.update(end_millis.to_be_bytes());
    Hash256::from_bytes(hasher.finalize().into())
}

/// SHA-256 helper
fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rhythm::compute_rhythm;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn make_exchange() -> Vec<MessageRecord> {
        vec![
            MessageRecord::new("alice", "bob", t0(), 12),
            MessageRecord::new("bob", "alice", t0() + Duration::minutes(4), 30),
            MessageRecord::new("alice", "bob", t0() + Duration::minutes(9), 7),
            MessageRecord::new("bob", "alice", t0() + Duration::minutes(200), 55),
        ]
    }

    #[test]
    fn test_insufficient_data() {
        let pair = ParticipantPair::new("alice", "bob");
        let messages = vec![MessageRecord::new("alice", "bob", t0(), 5)];
        let rhythm = compute_rhythm(&messages);

        let err = build_commitment(&pair, &messages, &rhythm).unwrap_err();
        assert!(matches!(
            err,
            FingerprintError::InsufficientData { required: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_empty_is_insufficient() {
        let pair = ParticipantPair::new("alice", "bob");
        let err = build_commitment(&pair, &[], &compute_rhythm(&[])).unwrap_err();
        assert_eq!(err.kind(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn test_two_messages_succeed() {
        let pair = ParticipantPair::new("alice", "bob");
        let messages = make_exchange()[..2].to_vec();
        let rhythm = compute_rhythm(&messages);

        let commitment = build_commitment(&pair, &messages, &rhythm).unwrap();
        assert_eq!(commitment.commitment.to_hex().len(), 2 + 32);
        assert_eq!(commitment.exchange_hash.to_hex().len(), 2 + 64);
        assert_eq!(commitment.period_start, t0());
        assert_eq!(commitment.period_end, t0() + Duration::minutes(4));
    }

    #[test]
    fn test_pair_order_independent() {
        let messages = make_exchange();
        let rhythm = compute_rhythm(&messages);

        let ab = build_commitment(&ParticipantPair::new("alice", "bob"), &messages, &rhythm).unwrap();
        let ba = build_commitment(&ParticipantPair::new("bob", "alice"), &messages, &rhythm).unwrap();

        assert_eq!(ab, ba);
    }

    #[test]
    fn test_message_order_independent() {
        let pair = ParticipantPair::new("alice", "bob");
        let messages = make_exchange();
        let mut reversed = messages.clone();
        reversed.reverse();

        let (_, a) = CommitmentBuilder::new().fingerprint(&pair, &messages).unwrap();
        let (_, b) = CommitmentBuilder::new().fingerprint(&pair, &reversed).unwrap();

        assert_eq!(a.exchange_hash, b.exchange_hash);
    }

    #[test]
    fn test_rhythm_change_changes_signature() {
        let pair = ParticipantPair::new("alice", "bob");
        let messages = make_exchange();
        let mut longer = messages.clone();
        longer[1].body_length = 500;

        let (_, a) = CommitmentBuilder::new().fingerprint(&pair, &messages).unwrap();
        let (_, b) = CommitmentBuilder::new().fingerprint(&pair, &longer).unwrap();

        // Same pair and start time, different behaviour
        assert_eq!(a.commitment, b.commitment);
        assert_ne!(a.rhythm_signature, b.rhythm_signature);
        assert_ne!(a.exchange_hash, b.exchange_hash);
    }

    #[test]
    fn test_different_pair_changes_commitment() {
        let messages = make_exchange();
        let rhythm = compute_rhythm(&messages);

        let a = build_commitment(&ParticipantPair::new("alice", "bob"), &messages, &rhythm).unwrap();
        let b = build_commitment(&ParticipantPair::new("alice", "carol"), &messages, &rhythm).unwrap();

        assert_ne!(a.commitment, b.commitment);
        assert_eq!(a.rhythm_signature, b.rhythm_signature);
    }

    #[test]
    fn test_canonical_rhythm_fields() {
        let rhythm = compute_rhythm(&make_exchange());
        let line = canonical_rhythm(&rhythm);

        assert!(line.starts_with("avg_latency_minutes="));
        assert!(line.contains(";gap_survival_ratio=1;"));
        assert!(!line.contains("message_count"));
    }

    #[test]
    fn test_verify_agreement() {
        let pair = ParticipantPair::new("alice", "bob");
        let (_, local) = CommitmentBuilder::new().fingerprint(&pair, &make_exchange()).unwrap();

        assert!(verify_agreement(&local, &local.exchange_hash));
        assert!(!verify_agreement(&local, &local.rhythm_signature));
    }
}
