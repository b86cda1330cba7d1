//! Book rendering: resolved messages plus settings in, one HTML file out.
//!
//! The document has four sections, in order: cover, preface (optional),
//! dedication (optional) and the conversation. Rendering reads the clock once,
//! for the year on the cover; [`BookRenderer::render_at`] takes that instant as
//! a parameter so output can be made byte-identical.
//!
//! # Example
//!
//! ```rust
//! use chatbook::config::BookSettings;
//! use chatbook::render::BookRenderer;
//! use chrono::{TimeZone, Utc};
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let html = BookRenderer::new()
//!     .render_at(&[], &BookSettings::new("Notre Histoire"), now)
//!     .unwrap();
//!
//! assert!(html.starts_with("<!DOCTYPE html>"));
//! assert!(html.contains("0 messages"));
//! ```

mod html;
mod speaker;
mod stats;
mod style;

pub use html::{INSTRUCTION_CODE_SERVICE, encode_uri_component, escape_html, instruction_code_url};
pub use speaker::{FirstSender, MostFrequentSender, SpeakerPolicy, sender_counts};
pub use stats::BookStats;
pub use style::{WEB_FONTS_URL, contrast_text, stylesheet};

use chrono::{DateTime, Datelike, Utc};
use tracing::debug;

use crate::config::BookSettings;
use crate::error::Result;
use crate::message::Message;

use html::Page;

/// Renders messages into a self-contained HTML book.
pub struct BookRenderer {
    speaker: Box<dyn SpeakerPolicy>,
}

impl Default for BookRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BookRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookRenderer").finish_non_exhaustive()
    }
}

impl BookRenderer {
    /// Creates a renderer whose primary speaker is the most frequent sender.
    pub fn new() -> Self {
        Self {
            speaker: Box::new(MostFrequentSender),
        }
    }

    /// Replaces the primary speaker policy.
    #[must_use]
    pub fn with_speaker_policy(mut self, policy: impl SpeakerPolicy + 'static) -> Self {
        self.speaker = Box::new(policy);
        self
    }

    /// Renders the book, reading the current date for the cover.
    pub fn render(&self, messages: &[Message], settings: &BookSettings) -> Result<String> {
        self.render_at(messages, settings, Utc::now())
    }

    /// Renders the book as of `now`.
    ///
    /// For fixed messages, settings and `now` the output is byte-identical.
    /// Fails only when the settings do not validate.
    pub fn render_at(
        &self,
        messages: &[Message],
        settings: &BookSettings,
        now: DateTime<Utc>,
    ) -> Result<String> {
        settings.validate()?;
        let locale = settings.chrono_locale()?;

        let stats = BookStats::collect(messages);
        let primary = self.speaker.primary_speaker(messages);
        debug!(primary = ?primary, messages = stats.messages, "rendering book");

        let page = Page {
            settings,
            stats: &stats,
            primary: primary.as_deref(),
            locale,
            year: now.year(),
        };

        Ok(html::document(messages, &page, &stylesheet(settings)))
    }
}
