//! Core modules for Trust Fingerprint

pub mod rhythm;
pub mod commitment;
pub mod evaluator;
pub mod report;
pub mod transcript;
pub mod adapter;
pub mod pipeline;
pub mod api;

pub use rhythm::{RhythmAnalyzer, compute_rhythm};
pub use commitment::{CommitmentBuilder, build_commitment, verify_agreement, canonical_rhythm};
pub use evaluator::{TrustEvaluator, evaluate_trust, sentiment};
pub use report::{ReportFormatter, format_report};
pub use transcript::TranscriptParser;
pub use adapter::{
    MessageStore, SignalReader, InMemoryMessageStore, StaticSignalReader,
    TranscriptFileStore, JsonSignalReader, filter_exchange,
};
pub use pipeline::{TrustPipeline, FingerprintOutcome, ReportRequest};
pub use api::{create_router, run_server};
