//! # Chatbook
//!
//! Turns a WhatsApp chat export (the `.zip` produced by "Export chat") into a
//! single self-contained HTML "book".
//!
//! ## Overview
//!
//! The pipeline has four stages, each fully consuming the previous one:
//!
//! 1. [`archive`] - splits the zip into transcript text and media payloads
//! 2. [`parsers`] - turns the transcript into ordered [`ParsedMessage`]s
//! 3. [`resolver`] - pairs image messages with payloads, generates
//!    placeholder codes for video and audio
//! 4. [`render`] - lays out cover, preface, dedication and conversation
//!
//! Only archive problems abort a conversion. Bad lines, missing photos and
//! undecodable payloads degrade locally and the book is still produced.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatbook::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let bytes = std::fs::read("WhatsApp Chat.zip")?;
//!     let conversion = convert_archive(&bytes)?;
//!
//!     let settings = BookSettings::new("Notre Histoire").with_authors("Alice & Bob");
//!     let html = render_document(&conversion.messages, &settings)?;
//!     std::fs::write("book.html", html)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`archive`] - [`extract_archive`](archive::extract_archive), [`MediaLibrary`](archive::MediaLibrary)
//! - [`parser`] - [`TranscriptParser`](parser::TranscriptParser) trait, [`ParseOutcome`](parser::ParseOutcome)
//! - [`parsers`] - [`WhatsAppParser`](parsers::WhatsAppParser)
//! - [`parsing`] - line grammars, timestamps, system notices, media classification
//! - [`resolver`] - [`MediaResolver`](resolver::MediaResolver)
//! - [`render`] - [`BookRenderer`](render::BookRenderer), speaker policies
//! - [`config`] - [`ParserConfig`], [`ResolverConfig`], [`BookSettings`]
//! - [`error`] - [`ChatbookError`], [`Result`]
//! - [`prelude`] - Convenient re-exports

pub mod archive;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod message;
pub mod parser;
pub mod parsers;
pub mod parsing;
pub mod render;
pub mod resolver;

use tracing::info;

// Re-export the main types at the crate root for convenience
pub use config::{BookSettings, ParserConfig, ResolverConfig};
pub use error::{ArchiveError, ChatbookError, MediaError, Result};
pub use message::{Message, MessageKind, ParsedMessage};

use parser::{ParseWarning, TranscriptParser};
use parsers::WhatsAppParser;
use render::BookRenderer;
use resolver::{MediaResolver, ResolveReport};

/// Result of converting one archive.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    /// Resolved messages, sorted by timestamp
    pub messages: Vec<Message>,
    /// Lines dropped with a reportable reason
    pub warnings: Vec<ParseWarning>,
    /// Media matching counts
    pub report: ResolveReport,
    /// Archive path of the transcript that was used
    pub transcript_name: String,
    /// Media files found in the archive
    pub media_files: usize,
    /// Archive entries ignored by the extractor
    pub skipped_entries: usize,
    /// Transcript lines that matched no grammar
    pub unmatched_lines: usize,
    /// Transcript lines skipped as system notices
    pub system_notices: usize,
}

/// Converts archive bytes into resolved messages with default configuration.
///
/// # Errors
///
/// Only [`ArchiveError`]s: the bytes are not a zip, or the zip holds no
/// transcript. A transcript with no usable line gives an empty message list.
pub fn convert_archive(bytes: &[u8]) -> Result<Conversion> {
    convert_archive_with(bytes, &ParserConfig::default(), &ResolverConfig::default())
}

/// Converts archive bytes with explicit parser and resolver configuration.
pub fn convert_archive_with(
    bytes: &[u8],
    parser_config: &ParserConfig,
    resolver_config: &ResolverConfig,
) -> Result<Conversion> {
    let extracted = archive::extract_archive(bytes)?;

    let outcome = WhatsAppParser::with_config(parser_config.clone()).parse_str(&extracted.transcript);
    let resolution = MediaResolver::with_config(resolver_config.clone())
        .resolve_with_report(outcome.messages, &extracted.media);

    info!(
        messages = resolution.messages.len(),
        warnings = outcome.warnings.len(),
        images = resolution.report.resolved_images(),
        "conversion finished"
    );

    Ok(Conversion {
        messages: resolution.messages,
        warnings: outcome.warnings,
        report: resolution.report,
        transcript_name: extracted.transcript_name,
        media_files: extracted.media.len(),
        skipped_entries: extracted.skipped_entries,
        unmatched_lines: outcome.unmatched_lines,
        system_notices: outcome.system_notices,
    })
}

/// Renders messages into the HTML book with the default speaker policy.
///
/// # Errors
///
/// [`ChatbookError::InvalidSettings`] or [`ChatbookError::InvalidLocale`] when
/// the settings do not validate.
pub fn render_document(messages: &[Message], settings: &BookSettings) -> Result<String> {
    BookRenderer::new().render(messages, settings)
}

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatbook::prelude::*;
/// ```
pub mod prelude {
    // Pipeline
    pub use crate::{Conversion, convert_archive, convert_archive_with, render_document};

    // Data model
    pub use crate::message::{Message, MessageKind, ParsedMessage};

    // Errors
    pub use crate::error::{ArchiveError, ChatbookError, MediaError, Result};

    // Configuration
    pub use crate::config::{BookSettings, FontFamily, ParserConfig, ResolverConfig, TextSize};

    // Stages
    pub use crate::archive::{ExtractedArchive, MediaLibrary, MediaPayload, extract_archive};
    pub use crate::parser::{ParseOutcome, ParseWarning, TranscriptParser};
    pub use crate::parsers::WhatsAppParser;
    pub use crate::render::{BookRenderer, FirstSender, MostFrequentSender, SpeakerPolicy};
    pub use crate::resolver::{MediaResolver, ResolveReport};
}
