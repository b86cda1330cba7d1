//! WhatsApp TXT export parser.
//!
//! Every line is tried against the grammar table in priority order:
//! - `[12/05/2023, 14:03:21] Sender: Message` (iOS)
//! - `12/05/2023, 14:03:21 - Sender: Message` (Android, with seconds)
//! - `12/05/23 14:03 - Sender: Message` (Android, short)
//!
//! Lines matching no grammar are dropped, or appended to the previous message
//! when continuation joining is enabled.

use tracing::{debug, info, warn};

use crate::config::ParserConfig;
use crate::message::ParsedMessage;
use crate::parser::{ParseOutcome, ParseWarning, ParseWarningKind, TranscriptParser};
use crate::parsing::notice::DIRECTION_MARK;
use crate::parsing::{GrammarTable, classify_body, normalize_timestamp, system_notice};

/// Parser for WhatsApp TXT exports.
///
/// # Example
///
/// ```rust
/// use chatbook::parser::TranscriptParser;
/// use chatbook::parsers::WhatsAppParser;
/// use chatbook::MessageKind;
///
/// let parser = WhatsAppParser::new();
/// let outcome = parser.parse_str("12/05/23 14:03 - Bob: VID-20230512-WA0002.mp4");
///
/// let message = &outcome.messages[0];
/// assert_eq!(message.kind, MessageKind::Video);
/// assert_eq!(message.content, "Vidéo partagée");
/// ```
#[derive(Debug, Clone, Default)]
pub struct WhatsAppParser {
    config: ParserConfig,
    grammars: GrammarTable,
}

impl WhatsAppParser {
    /// Creates a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            grammars: GrammarTable::standard(),
        }
    }

    /// Replaces the grammar table.
    #[must_use]
    pub fn with_grammars(mut self, grammars: GrammarTable) -> Self {
        self.grammars = grammars;
        self
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn parse_content(&self, content: &str) -> ParseOutcome {
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
        let mut outcome = ParseOutcome::default();

        // Index into outcome.messages of the message a continuation line may
        // extend; cleared whenever a matched line is dropped.
        let mut last_accepted: Option<usize> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim().trim_start_matches(DIRECTION_MARK);
            if line.is_empty() {
                continue;
            }

            let Some((grammar, parts)) = self.grammars.match_line(line) else {
                match last_accepted {
                    Some(i) if self.config.join_continuation_lines => {
                        let message = &mut outcome.messages[i];
                        message.content.push('\n');
                        message.content.push_str(line);
                    }
                    _ => outcome.unmatched_lines += 1,
                }
                continue;
            };

            let sender = parts.sender.trim().trim_matches(DIRECTION_MARK).trim();
            if self.config.skip_system_messages {
                if let Some(notice) = system_notice(parts.body) {
                    debug!(line = index + 1, %notice, "skipping system notice");
                    outcome.system_notices += 1;
                    last_accepted = None;
                    continue;
                }
                if sender.is_empty() {
                    outcome.system_notices += 1;
                    last_accepted = None;
                    continue;
                }
            }

            let timestamp = match normalize_timestamp(parts.date, parts.time) {
                Ok(ts) => ts,
                Err(e) => {
                    warn!(line = index + 1, grammar = grammar.name(), "dropping line: {e}");
                    outcome.warnings.push(ParseWarning {
                        line_number: index + 1,
                        line: line.to_string(),
                        kind: ParseWarningKind::InvalidDate(e),
                    });
                    last_accepted = None;
                    continue;
                }
            };

            let classified = classify_body(parts.body, &self.config);
            let mut message = ParsedMessage::new(timestamp, sender, classified.content)
                .with_kind(classified.kind);
            message.media_filename = classified.media_filename;

            last_accepted = Some(outcome.messages.len());
            outcome.messages.push(message);
        }

        // Stable: equal timestamps keep transcript order.
        outcome.messages.sort_by_key(|m| m.timestamp);

        info!(
            messages = outcome.messages.len(),
            warnings = outcome.warnings.len(),
            system_notices = outcome.system_notices,
            unmatched = outcome.unmatched_lines,
            "parsed transcript"
        );

        outcome
    }
}

impl TranscriptParser for WhatsAppParser {
    fn name(&self) -> &'static str {
        "WhatsApp"
    }

    fn parse_str(&self, content: &str) -> ParseOutcome {
        self.parse_content(content)
    }
}
