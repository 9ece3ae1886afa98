//! Core types for Trust Fingerprint

mod message;
mod rhythm;
mod commitment;
mod signal;
mod reason;
mod verdict;
mod report;

pub use message::{ParticipantId, ParticipantPair, MessageRecord, sort_by_timestamp};
pub use rhythm::RhythmMetrics;
pub use commitment::{FixedHash, CommitmentHash, Hash256, ParseHashError, ExchangeCommitment};
pub use signal::{TrustSignal, RelationshipFact, TrustThreshold};
pub use reason::VerdictReason;
pub use verdict::{TrustVerdict, StakeBucket};
pub use report::{StructuredReport, ReportError, Pipeline};
