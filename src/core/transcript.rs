//! Transcript parser: raw text → MessageRecord
//!
//! Line format:
//!   <RFC3339 timestamp> | <sender> -> <recipient> | <body>
//!
//! Blank lines and `#` comments are skipped. Only the body length is kept.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::TranscriptError;
use crate::types::MessageRecord;

lazy_static! {
    static ref RE_LINE: Regex = Regex::new(
        r"^\s*(?P<ts>\S+)\s*\|\s*(?P<sender>[^\s|]+)\s*->\s*(?P<recipient>[^\s|]+)\s*\|\s?(?P<body>.*)$"
    ).unwrap();
}

/// Parser for line-oriented transcripts
#[derive(Debug, Default)]
pub struct TranscriptParser;

impl TranscriptParser {
    /// Create new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a full transcript, failing on the first malformed line
    pub fn parse(&self, input: &str) -> Result<Vec<MessageRecord>, TranscriptError> {
        let mut messages = Vec::new();

        for (index, raw) in input.lines().enumerate() {
            // Trailing spaces belong to the body and count towards its length
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            messages.push(self.parse_line(line, index + 1)?);
        }

        Ok(messages)
    }

    /// Parse a single transcript line (1-based line number for errors)
    pub fn parse_line(&self, line: &str, line_no: usize) -> Result<MessageRecord, TranscriptError> {
        let caps = RE_LINE.captures(line).ok_or_else(|| TranscriptError {
            line: line_no,
            reason: "expected '<timestamp> | <sender> -> <recipient> | <body>'".to_string(),
        })?;

        let timestamp = DateTime::parse_from_rfc3339(&caps["ts"])
            .map_err(|e| TranscriptError {
                line: line_no,
                reason: format!("invalid timestamp '{}': {}", &caps["ts"], e),
            })?
            .with_timezone(&Utc);

        Ok(MessageRecord::new(
            &caps["sender"],
            &caps["recipient"],
            timestamp,
            caps["body"].chars().count() as u64,
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================
