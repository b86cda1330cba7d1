//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`PrimarySpeaker`] - which sender is laid out on the right
//!
//! [`Args`] also knows how to turn itself into the library's configuration
//! types, so the binary stays a thin sequence of pipeline calls.
//!
//! # Example
//!
//! ```rust
//! use clap::Parser;
//! use chatbook::cli::{Args, PrimarySpeaker};
//!
//! let args = Args::parse_from(["chatbook", "chat.zip", "--title", "Nous", "--primary", "first"]);
//! assert_eq!(args.primary, PrimarySpeaker::First);
//!
//! let settings = args.book_settings().unwrap();
//! assert_eq!(settings.title, "Nous");
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::archive::{MediaEntry, MediaPayload};
use crate::config::{BookSettings, FontFamily, ParserConfig, ResolverConfig, TextSize};
use crate::error::{ChatbookError, Result};
use crate::render::{BookRenderer, FirstSender, MostFrequentSender};
use crate::resolver::encode_data_uri;

/// Largest cover image accepted from the command line.
const MAX_COVER_BYTES: usize = 10 * 1024 * 1024;

/// Turn a WhatsApp chat export (.zip) into a self-contained HTML book.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatbook")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatbook \"WhatsApp Chat.zip\"
    chatbook chat.zip -o vacances.html --title \"Vacances 2023\" --authors \"Alice & Bob\"
    chatbook chat.zip --settings book.json --cover-image cover.jpg
    chatbook chat.zip --font script --text-size large --primary first
    chatbook chat.zip --messages-json messages.json -v")]
pub struct Args {
    /// Path to the exported chat archive (.zip)
    pub archive: PathBuf,

    /// Path to the HTML file to write
    #[arg(short, long, default_value = "book.html")]
    pub output: PathBuf,

    /// JSON file with book settings (flags below override it)
    #[arg(short, long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Book title
    #[arg(long)]
    pub title: Option<String>,

    /// Authors line on the cover
    #[arg(long)]
    pub authors: Option<String>,

    /// Text file whose lines become the preface paragraphs
    #[arg(long, value_name = "FILE")]
    pub preface_file: Option<PathBuf>,

    /// Dedication text
    #[arg(long)]
    pub dedication: Option<String>,

    /// Cover background color (#RRGGBB)
    #[arg(long, value_name = "COLOR")]
    pub cover_color: Option<String>,

    /// Image file shown on the cover
    #[arg(long, value_name = "FILE")]
    pub cover_image: Option<PathBuf>,

    /// Body text size
    #[arg(long, value_enum)]
    pub text_size: Option<TextSize>,

    /// Font family
    #[arg(long, value_enum)]
    pub font: Option<FontFamily>,

    /// Bubble color of the primary speaker (#RRGGBB)
    #[arg(long, value_name = "COLOR")]
    pub bubble_user: Option<String>,

    /// Bubble color of everyone else (#RRGGBB)
    #[arg(long, value_name = "COLOR")]
    pub bubble_other: Option<String>,

    /// Locale for date separators (e.g. fr_FR, en_US)
    #[arg(long)]
    pub locale: Option<String>,

    /// Do not reference the remote web-font stylesheet
    #[arg(long)]
    pub no_web_fonts: bool,

    /// Show a remote instruction code on photos that could not be found
    #[arg(long)]
    pub remote_codes: bool,

    /// Who is laid out on the right
    #[arg(long, value_enum, default_value = "most-frequent")]
    pub primary: PrimarySpeaker,

    /// Also write the resolved messages as JSON
    #[arg(long, value_name = "FILE")]
    pub messages_json: Option<PathBuf>,

    /// Encode media on the current thread only
    #[arg(long)]
    pub sequential: bool,

    /// Append lines without a timestamp to the previous message
    #[arg(long)]
    pub join_lines: bool,

    /// Keep group, encryption and security notices
    #[arg(long)]
    pub keep_notices: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Which sender is laid out on the right.
///
/// # Example
///
/// ```rust
/// use chatbook::cli::PrimarySpeaker;
///
/// let primary: PrimarySpeaker = "first".parse().unwrap();
/// assert_eq!(primary.to_string(), "first");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimarySpeaker {
    /// The sender with the most messages
    #[default]
    MostFrequent,

    /// The sender of the first message
    First,
}

impl PrimarySpeaker {
    /// Returns all accepted names.
    pub fn all_names() -> &'static [&'static str] {
        &["most-frequent", "first"]
    }

    /// Builds a renderer using this policy.
    pub fn renderer(self) -> BookRenderer {
        match self {
            PrimarySpeaker::MostFrequent => {
                BookRenderer::new().with_speaker_policy(MostFrequentSender)
            }
            PrimarySpeaker::First => BookRenderer::new().with_speaker_policy(FirstSender),
        }
    }
}

impl std::fmt::Display for PrimarySpeaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimarySpeaker::MostFrequent => write!(f, "most-frequent"),
            PrimarySpeaker::First => write!(f, "first"),
        }
    }
}

impl std::str::FromStr for PrimarySpeaker {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "most-frequent" | "most" => Ok(PrimarySpeaker::MostFrequent),
            "first" => Ok(PrimarySpeaker::First),
            _ => Err(format!(
                "Unknown primary speaker policy: '{}'. Expected one of: {}",
                s,
                PrimarySpeaker::all_names().join(", ")
            )),
        }
    }
}

impl Args {
    /// Loads the settings file (if any) and applies every override flag.
    pub fn book_settings(&self) -> Result<BookSettings> {
        let mut settings = match &self.settings {
            Some(path) => BookSettings::from_json_file(path)?,
            None => BookSettings::default(),
        };

        if let Some(title) = &self.title {
            settings.title.clone_from(title);
        }
        if let Some(authors) = &self.authors {
            settings.authors.clone_from(authors);
        }
        if let Some(path) = &self.preface_file {
            settings.preface = fs::read_to_string(path)
                .map_err(|e| ChatbookError::input_file("preface file", path, e))?;
        }
        if let Some(dedication) = &self.dedication {
            settings.dedication.clone_from(dedication);
        }
        if let Some(color) = &self.cover_color {
            settings.cover_color.clone_from(color);
        }
        if let Some(path) = &self.cover_image {
            settings.cover_image = Some(cover_image_data_uri(path)?);
        }
        if let Some(size) = self.text_size {
            settings.text_size = size;
        }
        if let Some(font) = self.font {
            settings.font_family = font;
        }
        if let Some(color) = &self.bubble_user {
            settings.bubble_color_user.clone_from(color);
        }
        if let Some(color) = &self.bubble_other {
            settings.bubble_color_other.clone_from(color);
        }
        if let Some(locale) = &self.locale {
            settings.locale.clone_from(locale);
        }
        if self.no_web_fonts {
            settings.web_fonts = false;
        }
        if self.remote_codes {
            settings.remote_instruction_codes = true;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Parser configuration from the flags.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::new()
            .with_join_continuation_lines(self.join_lines)
            .with_skip_system_messages(!self.keep_notices)
    }

    /// Resolver configuration from the flags.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new().with_parallel(!self.sequential)
    }

    /// Log filter directive for the verbosity level.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "chatbook=warn",
            1 => "chatbook=info",
            _ => "chatbook=debug",
        }
    }
}

/// Reads an image file and encodes it as a `data:` URI.
pub fn cover_image_data_uri(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| ChatbookError::input_file("cover image", path, e))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ChatbookError::invalid_settings("cover_image", "path has no file name"))?;

    let payload = MediaPayload::for_filename(&filename, bytes).ok_or_else(|| {
        ChatbookError::invalid_settings(
            "cover_image",
            format!("'{filename}' is not a supported image file"),
        )
    })?;

    encode_data_uri(&MediaEntry { filename, payload }, MAX_COVER_BYTES)
        .map_err(|e| ChatbookError::invalid_settings("cover_image", e.to_string()))
}
