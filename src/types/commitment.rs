//! Commitment types for privacy-preserving exchange attestation
//!
//! Three layered hashes:
//! - commitment: pair + start time (16-byte prefix of SHA-256)
//! - rhythm_signature: canonical rhythm metrics (SHA-256)
//! - exchange_hash: commitment ∥ rhythm_signature ∥ end time (SHA-256)
//!
//! Hashes are exchanged as `0x`-prefixed lowercase hex.

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::ParticipantPair;

/// Fixed-length hash value
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedHash<const N: usize>([u8; N]);

/// Truncated commitment hash
pub type CommitmentHash = FixedHash<16>;

/// Full SHA-256 hash
pub type Hash256 = FixedHash<32>;

impl<const N: usize> FixedHash<N> {
    /// Hash length in bytes
    pub const LEN: usize = N;

    pub fn from_bytes(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Compare without early exit on the first differing byte
    pub fn ct_eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Error parsing a hash from hex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHashError {
    pub expected_len: usize,
    pub reason: String,
}

impl fmt::Display for ParseHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}-byte hash: {}", self.expected_len, self.reason)
    }
}

impl std::error::Error for ParseHashError {}

impl<const N: usize> FromStr for FixedHash<N> {
    type Err = ParseHashError;

    /// Accepts `0x`-prefixed or bare hex, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);

        let bytes = hex::decode(digits).map_err(|e| ParseHashError {
            expected_len: N,
            reason: e.to_string(),
        })?;

        let array: [u8; N] = bytes.try_into().map_err(|b: Vec<u8>| ParseHashError {
            expected_len: N,
            reason: format!("got {} bytes", b.len()),
        })?;

        Ok(Self(array))
    }
}

impl<const N: usize> fmt::Display for FixedHash<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<const N: usize> fmt::Debug for FixedHash<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedHash({})", self.to_hex())
    }
}

impl<const N: usize> Serialize for FixedHash<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedHash<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Privacy-preserving commitment to one exchange between two parties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeCommitment {
    /// Anchors the pair and the start time
    pub commitment: CommitmentHash,
    /// Content-free behavioural fingerprint
    pub rhythm_signature: Hash256,
    /// Final fingerprint compared for mutual consent
    pub exchange_hash: Hash256,
    /// Sorted participant pair
    pub participants: ParticipantPair,
    /// Earliest message timestamp
    pub period_start: DateTime<Utc>,
    /// Latest message timestamp
    pub period_end: DateTime<Utc>,
}

impl ExchangeCommitment {
    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "pair={} | commitment={} | rhythm={} | exchange={}",
            self.participants.canonical_id(),
            self.commitment,
            self.rhythm_signature,
            self.exchange_hash,
        )
    }
}
