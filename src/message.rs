//! Message types produced by the parser and the resolver.
//!
//! - [`ParsedMessage`] is what the transcript parser extracts from one line.
//! - [`Message`] is a [`ParsedMessage`] enriched by the media resolver with an
//!   id, an inlined image payload or a placeholder code.
//!
//! Both are created once per pass and never mutated afterwards.
//!
//! # Example
//!
//! ```
//! use chatbook::message::{MessageKind, ParsedMessage};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2023, 5, 12, 14, 3, 21).unwrap();
//! let parsed = ParsedMessage::new(ts, "Alice", "hi");
//! assert_eq!(parsed.kind, MessageKind::Text);
//! assert!(parsed.media_filename.is_none());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four kinds of message the book knows how to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text
    #[default]
    Text,
    /// Photo, inlined when its payload is found
    Image,
    /// Video, never inlined; represented by a scannable code
    Video,
    /// Voice note or audio file, represented by a link
    Audio,
}

impl MessageKind {
    /// Returns `true` for every kind except [`MessageKind::Text`].
    pub fn is_media(self) -> bool {
        !matches!(self, MessageKind::Text)
    }

    /// Caption used when a media message has no text of its own.
    pub fn default_caption(self) -> Option<&'static str> {
        match self {
            MessageKind::Text => None,
            MessageKind::Image => Some("Photo partagée"),
            MessageKind::Video => Some("Vidéo partagée"),
            MessageKind::Audio => Some("Note vocale"),
        }
    }

    /// Lowercase tag, as used in placeholder locators.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Video => "video",
            MessageKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured record extracted from one transcript line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedMessage {
    /// When the message was sent (export-local time, stored as UTC).
    pub timestamp: DateTime<Utc>,

    /// Display name of the author, trimmed.
    pub sender: String,

    /// Message body, or a default caption for media without text.
    pub content: String,

    /// Text, image, video or audio.
    pub kind: MessageKind,

    /// File name referenced by the transcript line, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media_filename: Option<String>,
}

impl ParsedMessage {
    /// Creates a text message.
    pub fn new(
        timestamp: DateTime<Utc>,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            content: content.into(),
            kind: MessageKind::Text,
            media_filename: None,
        }
    }

    /// Builder method to set the message kind.
    #[must_use]
    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder method to set the referenced media file name.
    #[must_use]
    pub fn with_media_filename(mut self, filename: impl Into<String>) -> Self {
        self.media_filename = Some(filename.into());
        self
    }
}

/// A parsed message after media resolution.
///
/// Invariants maintained by the resolver:
/// - `media_data_uri` is only set for [`MessageKind::Image`] when a payload
///   was found and encoded.
/// - `placeholder_code` and `media_locator` are only set for
///   [`MessageKind::Video`] and [`MessageKind::Audio`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Stable identifier, unique within one conversion.
    pub id: String,

    /// When the message was sent.
    pub timestamp: DateTime<Utc>,

    /// Display name of the author.
    pub sender: String,

    /// Message body or default caption.
    pub content: String,

    /// Text, image, video or audio.
    pub kind: MessageKind,

    /// File name referenced by the transcript line.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media_filename: Option<String>,

    /// Name of the archive file actually attached to this message.
    ///
    /// For images this is the payload that was assigned (which may differ
    /// from `media_filename` after fuzzy or fallback matching); for video and
    /// audio it repeats the transcript's file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media_file_name: Option<String>,

    /// Inlined image as a `data:` URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media_data_uri: Option<String>,

    /// Local placeholder locator such as `#video-clip.mp4`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub media_locator: Option<String>,

    /// Scannable code image (a `data:` URI) encoding the locator.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub placeholder_code: Option<String>,
}

impl Message {
    /// Wraps a parsed message without any resolved media.
    pub fn from_parsed(id: impl Into<String>, parsed: ParsedMessage) -> Self {
        Self {
            id: id.into(),
            timestamp: parsed.timestamp,
            sender: parsed.sender,
            content: parsed.content,
            kind: parsed.kind,
            media_file_name: parsed.media_filename.clone(),
            media_filename: parsed.media_filename,
            media_data_uri: None,
            media_locator: None,
            placeholder_code: None,
        }
    }

    /// Returns `true` if an image payload was inlined.
    pub fn has_image(&self) -> bool {
        self.media_data_uri.is_some()
    }

    /// Returns `true` if the content is one of the default media captions.
    pub fn has_default_caption(&self) -> bool {
        self.kind
            .default_caption()
            .is_some_and(|caption| self.content == caption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 5, 12, 14, 3, 21).unwrap()
    }

    #[test]
    fn test_parsed_message_builder() {
        let msg = ParsedMessage::new(ts(), "Alice", "Photo partagée")
            .with_kind(MessageKind::Image)
            .with_media_filename("IMG-001.jpg");

        assert_eq!(msg.kind, MessageKind::Image);
        assert_eq!(msg.media_filename.as_deref(), Some("IMG-001.jpg"));
    }

    #[test]
    fn test_from_parsed_copies_fields() {
        let parsed = ParsedMessage::new(ts(), "Bob", "Note vocale")
            .with_kind(MessageKind::Audio)
            .with_media_filename("PTT-001.opus");
        let msg = Message::from_parsed("msg-00000", parsed);

        assert_eq!(msg.id, "msg-00000");
        assert_eq!(msg.sender, "Bob");
        assert_eq!(msg.kind, MessageKind::Audio);
        assert_eq!(msg.media_file_name.as_deref(), Some("PTT-001.opus"));
        assert!(!msg.has_image());
        assert!(msg.has_default_caption());
    }

    #[test]
    fn test_default_caption_only_for_media() {
        assert_eq!(MessageKind::Text.default_caption(), None);
        assert_eq!(MessageKind::Video.default_caption(), Some("Vidéo partagée"));

        let msg = Message::from_parsed("m", ParsedMessage::new(ts(), "A", "Note vocale"));
        assert!(!msg.has_default_caption());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&MessageKind::Video).unwrap();
        assert_eq!(json, "\"video\"");
        let kind: MessageKind = serde_json::from_str("\"audio\"").unwrap();
        assert_eq!(kind, MessageKind::Audio);
    }

    #[test]
    fn test_message_serialization_skips_empty_media() {
        let msg = Message::from_parsed("msg-00001", ParsedMessage::new(ts(), "Alice", "hi"));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"kind\":\"text\""));
        assert!(!json.contains("media_data_uri"));
        assert!(!json.contains("placeholder_code"));
    }
}
