//! Message model for rhythm analysis
//!
//! - MessageRecord = one message, content already reduced to its length
//! - ParticipantPair = the two parties, always stored sorted

use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque participant identifier (address, handle, atom id)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Lexicographically sorted pair of participants
///
/// Both parties build the same pair regardless of argument order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[ParticipantId; 2]", into = "[ParticipantId; 2]")]
pub struct ParticipantPair {
    first: ParticipantId,
    second: ParticipantId,
}

impl ParticipantPair {
    /// Create a sorted pair
    pub fn new(a: impl Into<ParticipantId>, b: impl Into<ParticipantId>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &ParticipantId {
        &self.first
    }

    pub fn second(&self) -> &ParticipantId {
        &self.second
    }

    /// Does this participant belong to the pair?
    pub fn contains(&self, id: &ParticipantId) -> bool {
        &self.first == id || &self.second == id
    }

    /// Is the message strictly between the two participants?
    pub fn covers(&self, message: &MessageRecord) -> bool {
        self.contains(&message.sender) && self.contains(&message.recipient)
    }

    /// Canonical identifier used in the commitment ("first:second")
    pub fn canonical_id(&self) -> String {
        format!("{}:{}", self.first, self.second)
    }
}

impl From<[ParticipantId; 2]> for ParticipantPair {
    fn from([a, b]: [ParticipantId; 2]) -> Self {
        Self::new(a, b)
    }
}

impl From<ParticipantPair> for [ParticipantId; 2] {
    fn from(pair: ParticipantPair) -> Self {
        [pair.first, pair.second]
    }
}

impl fmt::Display for ParticipantPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// A single message, content reduced to its length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub sender: ParticipantId,
    pub recipient: ParticipantId,
    pub timestamp: DateTime<Utc>,
    /// Body length in characters
    pub body_length: u64,
}

impl MessageRecord {
    pub fn new(
        sender: impl Into<ParticipantId>,
        recipient: impl Into<ParticipantId>,
        timestamp: DateTime<Utc>,
        body_length: u64,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            timestamp,
            body_length,
        }
    }
}

/// Stable sort by timestamp; ties keep read order
pub fn sort_by_timestamp(messages: &[MessageRecord]) -> Vec<&MessageRecord> {
    let mut sorted: Vec<&MessageRecord> = messages.iter().collect();
    sorted.sort_by_key(|m| m.timestamp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pair_is_sorted() {
        let ab = ParticipantPair::new("alice", "bob");
        let ba = ParticipantPair::new("bob", "alice");

        assert_eq!(ab, ba);
        assert_eq!(ab.first().as_str(), "alice");
        assert_eq!(ab.canonical_id(), "alice:bob");
    }

    #[test]
    fn test_pair_covers() {
        let pair = ParticipantPair::new("alice", "bob");
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        assert!(pair.covers(&MessageRecord::new("bob", "alice", ts, 3)));
        assert!(!pair.covers(&MessageRecord::new("bob", "carol", ts, 3)));
    }

    #[test]
    fn test_pair_deserialize_sorts() {
        let pair: ParticipantPair = serde_json::from_str(r#"["bob", "alice"]"#).unwrap();
        assert_eq!(pair.first().as_str(), "alice");
        assert_eq!(serde_json::to_string(&pair).unwrap(), r#"["alice","bob"]"#);
    }

    #[test]
    fn test_sort_is_stable() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let messages = vec![
            MessageRecord::new("bob", "alice", later, 1),
            MessageRecord::new("alice", "bob", ts, 2),
            MessageRecord::new("bob", "alice", ts, 3),
        ];

        let sorted = sort_by_timestamp(&messages);
        let lengths: Vec<u64> = sorted.iter().map(|m| m.body_length).collect();
        assert_eq!(lengths, vec![2, 3, 1]);
    }
}
