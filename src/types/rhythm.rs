//! Rhythm metrics: content-free behavioural statistics of an exchange

use serde::{Deserialize, Serialize};

/// Derived rhythm statistics
///
/// Every field is a pure function of the message sequence and is rounded
/// before being stored, so two parties computing it get identical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmMetrics {
    /// Minutes between consecutive messages where the sender changed
    pub response_latencies: Vec<f64>,
    /// Mean response latency, 1 decimal
    pub avg_latency_minutes: f64,
    /// Consecutive intervals longer than the gap threshold
    pub gap_count: u32,
    /// Fraction of gaps after which the exchange resumed, 2 decimals
    pub gap_survival_ratio: f64,
    /// Population variance of body length (chars²), nearest integer
    pub length_variance_chars2: u64,
    /// 1 - variance(hour of day) / 144, floored at 0, 2 decimals
    pub temporal_consistency: f64,
    /// Messages considered
    pub message_count: usize,
}

impl RhythmMetrics {
    /// Metrics for a sequence too short to show any rhythm
    pub fn empty(message_count: usize) -> Self {
        Self {
            response_latencies: Vec::new(),
            avg_latency_minutes: 0.0,
            gap_count: 0,
            gap_survival_ratio: 1.0,
            length_variance_chars2: 0,
            temporal_consistency: 0.0,
            message_count,
        }
    }

    /// Number of sender changes
    pub fn response_count(&self) -> usize {
        self.response_latencies.len()
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "messages={} | responses={} | avg_latency={:.1}m | gaps={} | survival={:.2} | len_var={} | consistency={:.2}",
            self.message_count,
            self.response_count(),
            self.avg_latency_minutes,
            self.gap_count,
            self.gap_survival_ratio,
            self.length_variance_chars2,
            self.temporal_consistency,
        )
    }
}
