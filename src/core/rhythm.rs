//! Rhythm Analyzer: behavioural statistics of a two-party exchange
//!
//! Only timing, sender order and body length are read, never content.
//! Output is rounded so independent parties get byte-identical metrics.

use chrono::Timelike;
use tracing::debug;

use crate::{GAP_THRESHOLD_MINUTES, TEMPORAL_VARIANCE_NORM};
use crate::types::{MessageRecord, RhythmMetrics, sort_by_timestamp};

/// Analyzer for message rhythm
#[derive(Debug, Default)]
pub struct RhythmAnalyzer;

impl RhythmAnalyzer {
    /// Create new analyzer
    pub fn new() -> Self {
        Self
    }

    /// Compute rhythm metrics from an unsorted message sequence
    ///
    /// Never fails: fewer than 2 messages yields zeroed metrics with
    /// `gap_survival_ratio = 1.0`.
    pub fn compute(&self, messages: &[MessageRecord]) -> RhythmMetrics {
        if messages.len() < 2 {
            return RhythmMetrics::empty(messages.len());
        }

        let sorted = sort_by_timestamp(messages);

        let latencies = self.calc_response_latencies(&sorted);
        let avg_latency_minutes = round_to(mean(&latencies), 1);
        let (gap_count, gap_survival_ratio) = self.calc_gap_survival(&sorted);
        let length_variance_chars2 = self.calc_length_variance(&sorted);
        let temporal_consistency = self.calc_temporal_consistency(&sorted);

        let metrics = RhythmMetrics {
            response_latencies: latencies.iter().map(|l| round_to(*l, 1)).collect(),
            avg_latency_minutes,
            gap_count,
            gap_survival_ratio,
            length_variance_chars2,
            temporal_consistency,
            message_count: messages.len(),
        };

        debug!(
            messages = metrics.message_count,
            responses = metrics.response_count(),
            avg_latency = metrics.avg_latency_minutes,
            gaps = metrics.gap_count,
            "rhythm computed"
        );

        metrics
    }

    /// Minutes between adjacent messages where the sender changed
    fn calc_response_latencies(&self, sorted: &[&MessageRecord]) -> Vec<f64> {
        sorted
            .windows(2)
            .filter(|w| w[0].sender != w[1].sender)
            .map(|w| minutes_between(w[0], w[1]))
            .collect()
    }

    /// Count gaps and the fraction after which the exchange resumed
    ///
    /// A gap sits between two recorded messages, so in a closed transcript
    /// the later message always exists and every gap survives.
    fn calc_gap_survival(&self, sorted: &[&MessageRecord]) -> (u32, f64) {
        let mut gaps = 0u32;
        let mut survived = 0u32;

        for (i, w) in sorted.windows(2).enumerate() {
            if minutes_between(w[0], w[1]) > GAP_THRESHOLD_MINUTES {
                gaps += 1;
                if sorted.get(i + 1).is_some() {
                    survived += 1;
                }
            }
        }

        let ratio = if gaps == 0 {
            1.0
        } else {
            round_to(survived as f64 / gaps as f64, 2)
        };

        (gaps, ratio)
    }

    /// Population variance of body length, nearest integer
    fn calc_length_variance(&self, sorted: &[&MessageRecord]) -> u64 {
        let lengths: Vec<f64> = sorted.iter().map(|m| m.body_length as f64).collect();
        population_variance(&lengths).round() as u64
    }

    /// 1 - variance(hour of day) / 144, floored at 0
    fn calc_temporal_consistency(&self, sorted: &[&MessageRecord]) -> f64 {
        let hours: Vec<f64> = sorted.iter().map(|m| m.timestamp.hour() as f64).collect();
        let score = (1.0 - population_variance(&hours) / TEMPORAL_VARIANCE_NORM).max(0.0);
        round_to(score, 2)
    }
}

/// Convenience wrapper over `RhythmAnalyzer::compute`
pub fn compute_rhythm(messages: &[MessageRecord]) -> RhythmMetrics {
    RhythmAnalyzer::new().compute(messages)
}

fn minutes_between(earlier: &MessageRecord, later: &MessageRecord) -> f64 {
    (later.timestamp - earlier.timestamp).num_milliseconds() as f64 / 60_000.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Round half away from zero to `decimals` places
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn msg(sender: &str, minutes: i64, len: u64) -> MessageRecord {
        let recipient = if sender == "alice" { "bob" } else { "alice" };
        MessageRecord::new(sender, recipient, t0() + Duration::minutes(minutes), len)
    }

    #[test]
    fn test_empty_input() {
        let metrics = compute_rhythm(&[]);
        assert_eq!(metrics.message_count, 0);
        assert_eq!(metrics.avg_latency_minutes, 0.0);
        assert_eq!(metrics.gap_survival_ratio, 1.0);
        assert!(metrics.response_latencies.is_empty());
    }

    #[test]
    fn test_singleton_input() {
        let metrics = compute_rhythm(&[msg("alice", 0, 40)]);
        assert_eq!(metrics.message_count, 1);
        assert_eq!(metrics.avg_latency_minutes, 0.0);
        assert_eq!(metrics.gap_survival_ratio, 1.0);
        assert_eq!(metrics.length_variance_chars2, 0);
    }

    #[test]
    fn test_response_latencies_skip_same_sender() {
        let messages = vec![
            msg("alice", 0, 10),
            msg("alice", 2, 10), // same sender, not a response
            msg("bob", 5, 10),   // response after 3 min
            msg("alice", 15, 10), // response after 10 min
        ];

        let metrics = compute_rhythm(&messages);
        assert_eq!(metrics.response_latencies, vec![3.0, 10.0]);
        assert_eq!(metrics.avg_latency_minutes, 6.5);
    }

    #[test]
    fn test_avg_latency_rounded_to_one_decimal() {
        // latencies 1, 1, 2 minutes → mean 1.333..
        let messages = vec![
            msg("alice", 0, 1),
            msg("bob", 1, 1),
            msg("alice", 2, 1),
            msg("bob", 4, 1),
        ];

        let metrics = compute_rhythm(&messages);
        assert_eq!(metrics.avg_latency_minutes, 1.3);
    }

    #[test]
    fn test_no_sender_change_means_zero_latency() {
        let messages = vec![msg("alice", 0, 5), msg("alice", 1, 5)];
        let metrics = compute_rhythm(&messages);
        assert!(metrics.response_latencies.is_empty());
        assert_eq!(metrics.avg_latency_minutes, 0.0);
    }

    #[test]
    fn test_gap_threshold_is_exclusive() {
        let messages = vec![
            msg("alice", 0, 5),
            msg("bob", 120, 5),   // exactly 120 min: not a gap
            msg("alice", 241, 5), // 121 min: gap
        ];

        let metrics = compute_rhythm(&messages);
        assert_eq!(metrics.gap_count, 1);
        assert_eq!(metrics.gap_survival_ratio, 1.0);
    }

    #[test]
    fn test_gap_counts_regardless_of_sender() {
        let messages = vec![msg("alice", 0, 5), msg("alice", 300, 5)];
        let metrics = compute_rhythm(&messages);
        assert_eq!(metrics.gap_count, 1);
    }

    #[test]
    fn test_length_variance() {
        // lengths 2, 4, 4, 4, 5, 5, 7, 9 → population variance 4
        let lengths = [2, 4, 4, 4, 5, 5, 7, 9];
        let messages: Vec<_> = lengths
            .iter()
            .enumerate()
            .map(|(i, len)| msg(if i % 2 == 0 { "alice" } else { "bob" }, i as i64, *len))
            .collect();

        let metrics = compute_rhythm(&messages);
        assert_eq!(metrics.length_variance_chars2, 4);
    }

    #[test]
    fn test_temporal_consistency_same_hour() {
        let messages = vec![msg("alice", 0, 5), msg("bob", 10, 5), msg("alice", 20, 5)];
        let metrics = compute_rhythm(&messages);
        assert_eq!(metrics.temporal_consistency, 1.0);
    }

    #[test]
    fn test_temporal_consistency_spread() {
        // hours 9 and 21 → variance 36 → 1 - 36/144 = 0.75
        let messages = vec![msg("alice", 0, 5), msg("bob", 12 * 60, 5)];
        let metrics = compute_rhythm(&messages);
        assert_eq!(metrics.temporal_consistency, 0.75);
    }

    #[test]
    fn test_temporal_consistency_extreme_spread() {
        // hours 0 and 23: widest possible spread within a day (variance 132.25)
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap();
        let messages = vec![
            MessageRecord::new("alice", "bob", base, 1),
            MessageRecord::new("bob", "alice", late, 1),
        ];

        let metrics = compute_rhythm(&messages);
        assert!(metrics.temporal_consistency >= 0.0);
        assert_eq!(metrics.temporal_consistency, round_to(1.0 - 132.25 / 144.0, 2));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let sorted = vec![msg("alice", 0, 3), msg("bob", 4, 8), msg("alice", 9, 1)];
        let shuffled = vec![sorted[2].clone(), sorted[0].clone(), sorted[1].clone()];

        assert_eq!(compute_rhythm(&sorted), compute_rhythm(&shuffled));
    }

    #[test]
    fn test_determinism() {
        let messages = vec![msg("alice", 0, 3), msg("bob", 7, 80), msg("alice", 400, 12)];
        let analyzer = RhythmAnalyzer::new();
        assert_eq!(analyzer.compute(&messages), analyzer.compute(&messages));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.25, 1), 1.3);
        assert_eq!(round_to(0.666, 2), 0.67);
        assert_eq!(round_to(7.4, 0), 7.0);
    }
}
