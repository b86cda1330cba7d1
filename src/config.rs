//! Configuration types for the parser, the resolver and the book layout.
//!
//! All structs are plain data with builder methods and serde support, so they
//! can be filled from a JSON file, from CLI flags or directly in code.
//!
//! - [`ParserConfig`] - transcript parsing switches
//! - [`ResolverConfig`] - media inlining and placeholder code settings
//! - [`BookSettings`] - title, texts and visual style of the rendered book
//!
//! # Example
//!
//! ```rust
//! use chatbook::config::{BookSettings, FontFamily, TextSize};
//!
//! let settings = BookSettings::new("Notre Histoire")
//!     .with_authors("Alice & Bob")
//!     .with_font_family(FontFamily::Script)
//!     .with_text_size(TextSize::Large);
//!
//! assert!(settings.validate().is_ok());
//! ```

use std::fs;
use std::path::Path;

use chrono::Locale;
use serde::{Deserialize, Serialize};

use crate::error::{ChatbookError, Result};
use crate::message::MessageKind;

/// Configuration for transcript parsing.
///
/// # Example
///
/// ```rust
/// use chatbook::config::ParserConfig;
/// use chatbook::message::MessageKind;
///
/// let config = ParserConfig::new()
///     .with_generic_media_kind(MessageKind::Video)
///     .with_join_continuation_lines(true);
/// assert!(config.skip_system_messages);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Drop group/encryption/security notices (default: true)
    pub skip_system_messages: bool,

    /// Append lines without a timestamp prefix to the previous message
    /// instead of dropping them (default: false)
    pub join_continuation_lines: bool,

    /// Kind assigned to a generic "media omitted" line with no file name
    /// (default: image)
    pub generic_media_kind: MessageKind,

    /// Caption for a generic "media omitted" line (default: "Média partagé")
    pub generic_media_caption: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            skip_system_messages: true,
            join_continuation_lines: false,
            generic_media_kind: MessageKind::Image,
            generic_media_caption: "Média partagé".to_string(),
        }
    }
}

impl ParserConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to skip system notices.
    #[must_use]
    pub fn with_skip_system_messages(mut self, skip: bool) -> Self {
        self.skip_system_messages = skip;
        self
    }

    /// Sets whether continuation lines are joined to the previous message.
    #[must_use]
    pub fn with_join_continuation_lines(mut self, join: bool) -> Self {
        self.join_continuation_lines = join;
        self
    }

    /// Sets the kind used for generic "media omitted" lines.
    #[must_use]
    pub fn with_generic_media_kind(mut self, kind: MessageKind) -> Self {
        self.generic_media_kind = kind;
        self
    }

    /// Sets the caption used for generic "media omitted" lines.
    #[must_use]
    pub fn with_generic_media_caption(mut self, caption: impl Into<String>) -> Self {
        self.generic_media_caption = caption.into();
        self
    }
}

/// Configuration for media resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Encode payloads and generate codes in parallel (default: true)
    pub parallel: bool,

    /// Largest image inlined into the book, in bytes (default: 25MB)
    pub max_inline_bytes: usize,

    /// Foreground color of placeholder codes (default: #7c3aed)
    pub code_dark_color: String,

    /// Background color of placeholder codes (default: #ffffff)
    pub code_light_color: String,

    /// Minimum edge length of placeholder codes in pixels (default: 200)
    pub code_size: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_inline_bytes: 25 * 1024 * 1024, // 25MB
            code_dark_color: "#7c3aed".to_string(),
            code_light_color: "#ffffff".to_string(),
            code_size: 200,
        }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that does all work on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Enables or disables parallel encoding.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the inline size limit.
    #[must_use]
    pub fn with_max_inline_bytes(mut self, max: usize) -> Self {
        self.max_inline_bytes = max;
        self
    }

    /// Sets the placeholder code colors.
    #[must_use]
    pub fn with_code_colors(mut self, dark: impl Into<String>, light: impl Into<String>) -> Self {
        self.code_dark_color = dark.into();
        self.code_light_color = light.into();
        self
    }

    /// Sets the placeholder code size.
    #[must_use]
    pub fn with_code_size(mut self, size: u32) -> Self {
        self.code_size = size;
        self
    }
}

/// Body text size of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    /// 14px
    Small,
    /// 16px
    #[default]
    Medium,
    /// 18px
    Large,
}

impl TextSize {
    /// CSS font size.
    pub fn css(self) -> &'static str {
        match self {
            TextSize::Small => "14px",
            TextSize::Medium => "16px",
            TextSize::Large => "18px",
        }
    }
}

/// Font family of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    /// Georgia
    #[default]
    Serif,
    /// Inter
    SansSerif,
    /// Dancing Script
    Script,
}

impl FontFamily {
    /// CSS font stack.
    pub fn css(self) -> &'static str {
        match self {
            FontFamily::Serif => "Georgia, serif",
            FontFamily::SansSerif => {
                "Inter, -apple-system, BlinkMacSystemFont, \"Segoe UI\", sans-serif"
            }
            FontFamily::Script => "\"Dancing Script\", cursive",
        }
    }
}

/// Title, texts and style of the rendered book.
///
/// Unknown JSON keys are rejected; missing keys take their defaults.
///
/// # Example
///
/// ```rust
/// use chatbook::config::{BookSettings, TextSize};
///
/// let settings = BookSettings::from_json_str(r##"{
///     "title": "Vacances 2023",
///     "text_size": "small",
///     "cover_color": "#EC4899"
/// }"##).unwrap();
///
/// assert_eq!(settings.title, "Vacances 2023");
/// assert_eq!(settings.text_size, TextSize::Small);
/// assert_eq!(settings.locale, "fr_FR");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookSettings {
    /// Book title shown on the cover and in the `<title>` element
    pub title: String,

    /// Authors line on the cover (omitted when empty)
    pub authors: String,

    /// Preface; each line becomes a paragraph (section omitted when empty)
    pub preface: String,

    /// Dedication (section omitted when empty)
    pub dedication: String,

    /// Cover background color
    pub cover_color: String,

    /// Optional cover image as a `data:` URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    /// Body text size
    pub text_size: TextSize,

    /// Font family
    pub font_family: FontFamily,

    /// Bubble color of the primary speaker
    pub bubble_color_user: String,

    /// Bubble color of everyone else
    pub bubble_color_other: String,

    /// Locale used for date separators (POSIX name, e.g. fr_FR)
    pub locale: String,

    /// Reference the remote web-font stylesheet (default: true)
    pub web_fonts: bool,

    /// Show a remote instructional code image on unavailable photos
    /// (default: false)
    pub remote_instruction_codes: bool,
}

impl Default for BookSettings {
    fn default() -> Self {
        Self {
            title: "Notre Histoire".to_string(),
            authors: String::new(),
            preface: String::new(),
            dedication: String::new(),
            cover_color: "#8B5CF6".to_string(),
            cover_image: None,
            text_size: TextSize::Medium,
            font_family: FontFamily::Serif,
            bubble_color_user: "#8B5CF6".to_string(),
            bubble_color_other: "#ffffff".to_string(),
            locale: "fr_FR".to_string(),
            web_fonts: true,
            remote_instruction_codes: false,
        }
    }
}

impl BookSettings {
    /// Creates settings with the given title and defaults for everything else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Parses settings from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads settings from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| ChatbookError::input_file("settings file", path, e))?;
        Self::from_json_str(&json)
    }

    /// Sets the authors line.
    #[must_use]
    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = authors.into();
        self
    }

    /// Sets the preface.
    #[must_use]
    pub fn with_preface(mut self, preface: impl Into<String>) -> Self {
        self.preface = preface.into();
        self
    }

    /// Sets the dedication.
    #[must_use]
    pub fn with_dedication(mut self, dedication: impl Into<String>) -> Self {
        self.dedication = dedication.into();
        self
    }

    /// Sets the cover color.
    #[must_use]
    pub fn with_cover_color(mut self, color: impl Into<String>) -> Self {
        self.cover_color = color.into();
        self
    }

    /// Sets the cover image (`data:` URI).
    #[must_use]
    pub fn with_cover_image(mut self, data_uri: impl Into<String>) -> Self {
        self.cover_image = Some(data_uri.into());
        self
    }

    /// Sets the text size.
    #[must_use]
    pub fn with_text_size(mut self, size: TextSize) -> Self {
        self.text_size = size;
        self
    }

    /// Sets the font family.
    #[must_use]
    pub fn with_font_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    /// Sets both bubble colors.
    #[must_use]
    pub fn with_bubble_colors(mut self, user: impl Into<String>, other: impl Into<String>) -> Self {
        self.bubble_color_user = user.into();
        self.bubble_color_other = other.into();
        self
    }

    /// Sets the date locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Enables or disables the remote web-font stylesheet.
    #[must_use]
    pub fn with_web_fonts(mut self, enabled: bool) -> Self {
        self.web_fonts = enabled;
        self
    }

    /// Enables or disables remote instruction codes on missing photos.
    #[must_use]
    pub fn with_remote_instruction_codes(mut self, enabled: bool) -> Self {
        self.remote_instruction_codes = enabled;
        self
    }

    /// Resolves the configured locale.
    pub fn chrono_locale(&self) -> Result<Locale> {
        Locale::try_from(self.locale.as_str())
            .map_err(|_| ChatbookError::invalid_locale(self.locale.clone()))
    }

    /// Checks that colors, cover image and locale are usable.
    ///
    /// Colors end up inside a stylesheet, so only `#rgb`, `#rrggbb` and
    /// `#rrggbbaa` are accepted.
    pub fn validate(&self) -> Result<()> {
        check_color("cover_color", &self.cover_color)?;
        check_color("bubble_color_user", &self.bubble_color_user)?;
        check_color("bubble_color_other", &self.bubble_color_other)?;

        if let Some(image) = &self.cover_image {
            if !image.starts_with("data:image/") {
                return Err(ChatbookError::invalid_settings(
                    "cover_image",
                    "expected a data:image/... URI",
                ));
            }
        }

        self.chrono_locale()?;
        Ok(())
    }

    /// Two-letter language code for the `lang` attribute.
    pub fn language(&self) -> &str {
        self.locale
            .split(['_', '-'])
            .next()
            .filter(|lang| !lang.is_empty())
            .unwrap_or("fr")
    }
}

fn check_color(field: &'static str, value: &str) -> Result<()> {
    let valid = value.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
    });

    if valid {
        Ok(())
    } else {
        Err(ChatbookError::invalid_settings(
            field,
            format!("'{value}' is not a hex color (#RGB or #RRGGBB)"),
        ))
    }
}
