//! Transcript parser trait and its output.
//!
//! A parser turns the transcript text into an ordered list of
//! [`ParsedMessage`]s. Lines it cannot use are dropped; the only dropped lines
//! that are reported are those whose timestamp could not be normalized.
//!
//! # Example
//!
//! ```rust
//! use chatbook::parser::TranscriptParser;
//! use chatbook::parsers::WhatsAppParser;
//!
//! let parser = WhatsAppParser::new();
//! let outcome = parser.parse_str("[12/05/2023, 14:03:21] Alice: hi\n12/05/23 14:05 - Bob: yo");
//!
//! assert_eq!(outcome.messages.len(), 2);
//! assert_eq!(outcome.messages[0].sender, "Alice");
//! assert!(outcome.warnings.is_empty());
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::error::Result;
use crate::message::ParsedMessage;
use crate::parsing::TimestampError;

/// Why a line was reported instead of becoming a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarningKind {
    /// The line matched a grammar but its date/time is not a real instant.
    #[error("invalid date: {0}")]
    InvalidDate(#[from] TimestampError),
}

/// A recoverable problem with one transcript line.
///
/// The line is left out of the output. It is never given a guessed timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number in the transcript.
    pub line_number: usize,
    /// The offending line, trimmed.
    pub line: String,
    /// What went wrong.
    pub kind: ParseWarningKind,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.kind, self.line)
    }
}

/// Everything a parse pass produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Messages sorted by timestamp; ties keep transcript order.
    pub messages: Vec<ParsedMessage>,
    /// Lines dropped with a reportable reason.
    pub warnings: Vec<ParseWarning>,
    /// Non-empty lines that matched no grammar (and were not joined).
    pub unmatched_lines: usize,
    /// Lines skipped as system notices.
    pub system_notices: usize,
}

impl ParseOutcome {
    /// Returns `true` if no line produced a warning.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Discards the diagnostics and keeps the messages.
    pub fn into_messages(self) -> Vec<ParsedMessage> {
        self.messages
    }
}

/// Parser for one transcript dialect.
///
/// Implementations must:
/// - never fail on malformed input (bad lines are dropped or reported),
/// - return messages in non-decreasing timestamp order.
pub trait TranscriptParser: Send + Sync {
    /// Returns the human-readable name of this parser.
    fn name(&self) -> &'static str;

    /// Parses transcript text.
    fn parse_str(&self, content: &str) -> ParseOutcome;

    /// Reads and parses a transcript file.
    fn parse(&self, path: &Path) -> Result<ParseOutcome> {
        let content = fs::read_to_string(path)?;
        Ok(self.parse_str(&content))
    }
}
