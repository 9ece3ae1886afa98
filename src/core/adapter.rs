//! External collaborator seams
//!
//! - MessageStore: message records for a pair of participants
//! - SignalReader: existence/stake facts for an identity
//!
//! Implementations own I/O, parsing and staleness. Every failure they
//! report is wrapped as `FingerprintError::AdapterFailure`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::transcript::TranscriptParser;
use crate::error::FingerprintError;
use crate::types::{MessageRecord, ParticipantId, ParticipantPair, TrustSignal};

/// Source of message records
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Messages exchanged between `a` and `b`, optionally since an instant
    ///
    /// Records may come back unsorted; the analyzer sorts them.
    async fn fetch_messages(
        &self,
        a: &ParticipantId,
        b: &ParticipantId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<MessageRecord>, FingerprintError>;

    /// Store identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// Source of trust signals
#[async_trait]
pub trait SignalReader: Send + Sync {
    /// Existence, claim and stake facts for an identity
    async fn read_identity_signal(&self, identity_key: &str) -> Result<TrustSignal, FingerprintError>;

    /// Reader identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// Keep only messages between the pair, at or after `since`
pub fn filter_exchange(
    messages: impl IntoIterator<Item = MessageRecord>,
    a: &ParticipantId,
    b: &ParticipantId,
    since: Option<DateTime<Utc>>,
) -> Vec<MessageRecord> {
    let pair = ParticipantPair::new(a.clone(), b.clone());
    messages
        .into_iter()
        .filter(|m| pair.covers(m) && m.sender != m.recipient)
        .filter(|m| since.map_or(true, |s| m.timestamp >= s))
        .collect()
}

// =============================================================================
// In-memory adapters
// =============================================================================

/// Message store over records already in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryMessageStore {
    messages: Vec<MessageRecord>,
}

impl InMemoryMessageStore {
    pub fn new(messages: Vec<MessageRecord>) -> Self {
        Self { messages }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn fetch_messages(
        &self,
        a: &ParticipantId,
        b: &ParticipantId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<MessageRecord>, FingerprintError> {
        Ok(filter_exchange(self.messages.iter().cloned(), a, b, since))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Signal reader over a fixed identity → signal map
///
/// Unknown identities read as `TrustSignal::unknown_identity()`.
#[derive(Debug, Default, Clone)]
pub struct StaticSignalReader {
    signals: HashMap<String, TrustSignal>,
}

impl StaticSignalReader {
    pub fn new(signals: HashMap<String, TrustSignal>) -> Self {
        Self { signals }
    }

    pub fn insert(&mut self, identity_key: impl Into<String>, signal: TrustSignal) {
        self.signals.insert(identity_key.into(), signal);
    }
}

#[async_trait]
impl SignalReader for StaticSignalReader {
    async fn read_identity_signal(&self, identity_key: &str) -> Result<TrustSignal, FingerprintError> {
        Ok(self
            .signals
            .get(identity_key)
            .cloned()
            .unwrap_or_else(TrustSignal::unknown_identity))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// =============================================================================
// File adapters
// =============================================================================

/// Message store backed by a transcript file (see `TranscriptParser`)
#[derive(Debug, Clone)]
pub struct TranscriptFileStore {
    path: PathBuf,
}

impl TranscriptFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MessageStore for TranscriptFileStore {
    async fn fetch_messages(
        &self,
        a: &ParticipantId,
        b: &ParticipantId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<MessageRecord>, FingerprintError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FingerprintError::adapter(self.name(), e))?;

        let messages = TranscriptParser::new()
            .parse(&content)
            .map_err(|e| FingerprintError::adapter(self.name(), e))?;

        Ok(filter_exchange(messages, a, b, since))
    }

    fn name(&self) -> &'static str {
        "transcript-file"
    }
}

/// Signal reader backed by a JSON object `{ "<identity>": TrustSignal }`
///
/// The file is re-read on every call so an external exporter can refresh it.
#[derive(Debug, Clone)]
pub struct JsonSignalReader {
    path: PathBuf,
}

impl JsonSignalReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SignalReader for JsonSignalReader {
    async fn read_identity_signal(&self, identity_key: &str) -> Result<TrustSignal, FingerprintError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FingerprintError::adapter(self.name(), e))?;

        let signals: HashMap<String, TrustSignal> = serde_json::from_str(&content)
            .map_err(|e| FingerprintError::adapter(self.name(), e))?;

        StaticSignalReader::new(signals)
            .read_identity_signal(identity_key)
            .await
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::io::Write;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn sample_store() -> InMemoryMessageStore {
        InMemoryMessageStore::new(vec![
            MessageRecord::new("alice", "bob", t0(), 5),
            MessageRecord::new("bob", "alice", t0() + Duration::minutes(2), 5),
            MessageRecord::new("alice", "carol", t0() + Duration::minutes(3), 5),
            MessageRecord::new("bob", "alice", t0() + Duration::minutes(10), 5),
        ])
    }

    #[tokio::test]
    async fn test_memory_store_filters_pair() {
        let store = sample_store();
        let messages = store
            .fetch_messages(&"bob".into(), &"alice".into(), None)
            .await
            .unwrap();
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test]
    async fn test_memory_store_since_inclusive() {
        let store = sample_store();
        let since = t0() + Duration::minutes(2);
        let messages = store
            .fetch_messages(&"alice".into(), &"bob".into(), Some(since))
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn test_static_reader_unknown_identity() {
        let mut reader = StaticSignalReader::default();
        reader.insert("alice.eth", TrustSignal::staked(3.0, 0.0));

        let known = reader.read_identity_signal("alice.eth").await.unwrap();
        assert!(known.identity_exists);

        let unknown = reader.read_identity_signal("mallory.eth").await.unwrap();
        assert!(!unknown.identity_exists);
    }

    #[tokio::test]
    async fn test_transcript_file_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "2024-05-01T09:00:00Z | alice -> bob | hello").unwrap();
        writeln!(file, "2024-05-01T09:03:00Z | bob -> alice | hi!").unwrap();
        writeln!(file, "2024-05-01T09:04:00Z | carol -> bob | psst").unwrap();

        let store = TranscriptFileStore::new(file.path());
        let messages = store
            .fetch_messages(&"alice".into(), &"bob".into(), None)
            .await
            .unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].body_length, 3);
    }

    #[tokio::test]
    async fn test_transcript_file_missing() {
        let store = TranscriptFileStore::new("/nonexistent/transcript.txt");
        let err = store
            .fetch_messages(&"alice".into(), &"bob".into(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ADAPTER_FAILURE");
    }

    #[tokio::test]
    async fn test_transcript_file_malformed_is_adapter_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "garbage").unwrap();

        let err = TranscriptFileStore::new(file.path())
            .fetch_messages(&"alice".into(), &"bob".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FingerprintError::AdapterFailure { adapter: "transcript-file", .. }));
    }

    #[tokio::test]
    async fn test_json_signal_reader() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"alice.eth": {{"identity_exists": true, "claim_exists": true, "for_stake": 2.5, "against_stake": 0.5}}}}"#
        )
        .unwrap();

        let reader = JsonSignalReader::new(file.path());
        let signal = reader.read_identity_signal("alice.eth").await.unwrap();
        assert_eq!(signal.for_stake, 2.5);
        assert!(signal.relationship_claims.is_empty());

        let missing = reader.read_identity_signal("bob.eth").await.unwrap();
        assert!(!missing.identity_exists);
    }

    #[tokio::test]
    async fn test_json_signal_reader_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = JsonSignalReader::new(file.path())
            .read_identity_signal("alice.eth")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ADAPTER_FAILURE");
    }
}
