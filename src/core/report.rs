//! Verdict/Report Formatter
//!
//! Merges whichever pipeline outputs are present into one versioned
//! record, and renders it for terminals.

use colored::Colorize;

use crate::REPORT_VERSION;
use crate::error::FingerprintError;
use crate::types::{
    ExchangeCommitment, Pipeline, ReportError, RhythmMetrics,
    StructuredReport, TrustVerdict,
};

/// Report formatter
#[derive(Debug, Default)]
pub struct ReportFormatter;

impl ReportFormatter {
    /// Create new formatter
    pub fn new() -> Self {
        Self
    }

    /// Merge optional commitment and verdict into one report
    pub fn format(
        &self,
        commitment: Option<&ExchangeCommitment>,
        verdict: Option<&TrustVerdict>,
    ) -> StructuredReport {
        StructuredReport {
            version: REPORT_VERSION,
            fingerprint: commitment.cloned(),
            rhythm: None,
            verdict: verdict.cloned(),
            errors: Vec::new(),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self, report: &StructuredReport) -> String {
        let mut lines = Vec::new();

        if let Some(commitment) = &report.fingerprint {
            lines.push(format!(
                "{} {} {}",
                "◆ fingerprint".cyan().bold(),
                commitment.participants.to_string().bold(),
                format!(
                    "{} → {}",
                    commitment.period_start.to_rfc3339(),
                    commitment.period_end.to_rfc3339()
                )
                .dimmed()
            ));
            lines.push(format!("  commitment  {}", commitment.commitment));
            lines.push(format!("  rhythm      {}", commitment.rhythm_signature));
            lines.push(format!("  exchange    {}", commitment.exchange_hash.to_string().green()));
        }

        if let Some(rhythm) = &report.rhythm {
            lines.push(format!("  {}", rhythm.to_parseable_string().dimmed()));
        }

        if let Some(verdict) = &report.verdict {
            let headline = if verdict.trusted {
                "✓ TRUSTED".green().bold()
            } else {
                "✗ NOT TRUSTED".red().bold()
            };
            let contested = if verdict.contested {
                " contested".yellow().to_string()
            } else {
                String::new()
            };
            lines.push(format!(
                "{} stake={:.4} ({}) sentiment={:.3}{} | {}",
                headline,
                verdict.stake,
                verdict.stake_bucket,
                verdict.sentiment,
                contested,
                verdict.reason.code()
            ));
            for fact in &verdict.relationships {
                lines.push(format!(
                    "  {} {} {} {}",
                    fact.subject,
                    fact.relation.italic(),
                    fact.object,
                    format!("(stake {:.4})", fact.stake).dimmed()
                ));
            }
        }

        for error in &report.errors {
            lines.push(format!(
                "{} {} {}: {}",
                "⚠".red(),
                error.pipeline,
                error.kind.red().bold(),
                error.message
            ));
        }

        lines.join("\n")
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self, report: &StructuredReport) -> String {
        let mut lines = Vec::new();

        if let Some(commitment) = &report.fingerprint {
            lines.push(commitment.to_parseable_string());
        }
        if let Some(rhythm) = &report.rhythm {
            lines.push(rhythm.to_parseable_string());
        }
        if let Some(verdict) = &report.verdict {
            lines.push(verdict.to_parseable_string());
        }
        for error in &report.errors {
            lines.push(format!("error | pipeline={} | kind={} | {}", error.pipeline, error.kind, error.message));
        }

        lines.join("\n")
    }
}

/// Convenience wrapper over `ReportFormatter::format`
pub fn format_report(
    commitment: Option<&ExchangeCommitment>,
    verdict: Option<&TrustVerdict>,
) -> StructuredReport {
    ReportFormatter::new().format(commitment, verdict)
}

impl StructuredReport {
    /// Attach the rhythm metrics behind the fingerprint
    pub fn with_rhythm(mut self, rhythm: &RhythmMetrics) -> Self {
        self.rhythm = Some(rhythm.clone());
        self
    }

    /// Record a pipeline that aborted
    pub fn with_error(mut self, pipeline: Pipeline, error: &FingerprintError) -> Self {
        self.errors.push(ReportError {
            pipeline,
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
