//! Ordered table of transcript line grammars.
//!
//! Every grammar is a regex with four named groups: `date`, `time`, `sender`
//! and `body`. The table is tried in order and the first grammar that
//! matches a line wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ChatbookError, Result};

/// Capture groups every grammar must define.
pub const REQUIRED_GROUPS: [&str; 4] = ["date", "time", "sender", "body"];

/// Built-in line formats, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// iOS style with seconds
    /// Example: [12/05/2023, 14:03:21] Alice: hi
    Bracketed,
    /// Android style, four-digit year, with seconds
    /// Example: 12/05/2023, 14:03:21 - Alice: hi
    DashedLongYear,
    /// Android style, one or two digit day/month, short or long year
    /// Example: 12/05/23 14:03 - Bob: yo
    DashedShort,
}

impl LineFormat {
    /// Returns the regex pattern for this format.
    pub fn pattern(self) -> &'static str {
        match self {
            LineFormat::Bracketed => {
                r"^\[(?P<date>\d{2}/\d{2}/\d{4}),?\s(?P<time>\d{2}:\d{2}:\d{2})\]\s(?P<sender>.+?):\s(?P<body>.*)$"
            }
            LineFormat::DashedLongYear => {
                r"^(?P<date>\d{2}/\d{2}/\d{4}),?\s(?P<time>\d{2}:\d{2}:\d{2})\s-\s(?P<sender>.+?):\s(?P<body>.*)$"
            }
            LineFormat::DashedShort => {
                r"^(?P<date>\d{1,2}/\d{1,2}/\d{2,4}),?\s(?P<time>\d{1,2}:\d{2})\s-\s(?P<sender>.+?):\s(?P<body>.*)$"
            }
        }
    }

    /// Short name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            LineFormat::Bracketed => "bracketed",
            LineFormat::DashedLongYear => "dashed-long-year",
            LineFormat::DashedShort => "dashed-short",
        }
    }

    /// Returns all built-in formats in priority order.
    pub fn all() -> &'static [LineFormat] {
        &[
            LineFormat::Bracketed,
            LineFormat::DashedLongYear,
            LineFormat::DashedShort,
        ]
    }
}

/// Pieces of one matched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParts<'a> {
    /// Date as written, e.g. `12/05/23`
    pub date: &'a str,
    /// Time as written, e.g. `14:03`
    pub time: &'a str,
    /// Sender, untrimmed
    pub sender: &'a str,
    /// Everything after `Sender: `
    pub body: &'a str,
}

/// One rule of the table: a name and a compiled pattern.
#[derive(Debug, Clone)]
pub struct LineGrammar {
    name: String,
    regex: Regex,
}

impl LineGrammar {
    /// Compiles a grammar, checking that all required groups exist.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        let name = name.into();
        let regex =
            Regex::new(pattern).map_err(|e| ChatbookError::invalid_grammar(&name, e.to_string()))?;

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        for group in REQUIRED_GROUPS {
            if !names.contains(&group) {
                return Err(ChatbookError::invalid_grammar(
                    &name,
                    format!("missing named group '{group}'"),
                ));
            }
        }

        Ok(Self { name, regex })
    }

    /// Returns the grammar name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extracts date, time, sender and body if the line matches.
    pub fn parts<'a>(&self, line: &'a str) -> Option<LineParts<'a>> {
        let caps = self.regex.captures(line)?;
        Some(LineParts {
            date: caps.name("date")?.as_str(),
            time: caps.name("time")?.as_str(),
            sender: caps.name("sender")?.as_str(),
            body: caps.name("body").map_or("", |m| m.as_str()),
        })
    }
}

static STANDARD: LazyLock<Vec<LineGrammar>> = LazyLock::new(|| {
    LineFormat::all()
        .iter()
        .map(|format| LineGrammar {
            name: format.name().to_string(),
            regex: Regex::new(format.pattern()).expect("built-in grammar must compile"),
        })
        .collect()
});

/// Ordered list of grammars.
#[derive(Debug, Clone)]
pub struct GrammarTable {
    grammars: Vec<LineGrammar>,
}

impl Default for GrammarTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl GrammarTable {
    /// The three built-in WhatsApp grammars.
    pub fn standard() -> Self {
        Self {
            grammars: STANDARD.clone(),
        }
    }

    /// A table with no grammars, for building custom rule sets.
    pub fn empty() -> Self {
        Self {
            grammars: Vec::new(),
        }
    }

    /// Appends a grammar with the lowest priority.
    #[must_use]
    pub fn with_grammar(mut self, grammar: LineGrammar) -> Self {
        self.grammars.push(grammar);
        self
    }

    /// Returns the grammars in priority order.
    pub fn grammars(&self) -> &[LineGrammar] {
        &self.grammars
    }

    /// Tries every grammar in order; the first match wins.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<(&LineGrammar, LineParts<'a>)> {
        self.grammars
            .iter()
            .find_map(|grammar| grammar.parts(line).map(|parts| (grammar, parts)))
    }
}
