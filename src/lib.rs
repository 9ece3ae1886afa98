//! Trust Fingerprint: conversation rhythm, exchange commitments and trust verdicts
//!
//! Two independent pipelines:
//!   MessageStore → RhythmAnalyzer → CommitmentBuilder
//!   SignalReader → TrustEvaluator → ReportFormatter

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{ConfigError, FingerprintError, TranscriptError};

// =============================================================================
// RHYTHM [C] - Shared by both parties, never configurable
// =============================================================================

/// Interval between consecutive messages that counts as a gap (minutes)
pub const GAP_THRESHOLD_MINUTES: f64 = 120.0;

/// Hour-of-day variance normalisation (12²)
/// A variance of 144 or more yields a temporal consistency of 0
pub const TEMPORAL_VARIANCE_NORM: f64 = 144.0;

/// Minimum messages for a cross-party verifiable commitment
pub const MIN_COMMITMENT_MESSAGES: usize = 2;

/// Commitment display prefix (bytes of SHA-256 kept)
pub const COMMITMENT_PREFIX_BYTES: usize = 16;

// =============================================================================
// STAKE BUCKETS [C] - Reporting only, never gating
// =============================================================================

/// Below this the stake is MINIMAL
pub const STAKE_BUCKET_LOW: f64 = 0.1;

/// Below this the stake is LOW
pub const STAKE_BUCKET_MODERATE: f64 = 1.0;

/// Above this the stake is STRONG
pub const STAKE_BUCKET_STRONG: f64 = 10.0;

// =============================================================================
// DEFAULT THRESHOLDS
// =============================================================================

/// Default minimum for-stake before an identity is trusted
pub const DEFAULT_MIN_STAKE: f64 = 1.0;

/// Default minimum sentiment before an identity is trusted
pub const DEFAULT_MIN_SENTIMENT: f64 = 0.8;

/// Default adapter timeout (seconds)
pub const DEFAULT_ADAPTER_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// VERSION
// =============================================================================

/// Structured report schema version
pub const REPORT_VERSION: u32 = 1;

pub const VERSION: &str = "1.0.0";
