//! Fixed extension table shared by the extractor and the parser.
//!
//! Only the extensions listed here are recognized anywhere in the crate;
//! archive entries with other extensions are ignored.

use crate::message::MessageKind;

/// Broad category of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    /// jpg, jpeg, png, gif, webp
    Image,
    /// mp4, mov, avi, 3gp
    Video,
    /// opus, aac, m4a, mp3, wav
    Audio,
    /// pdf, doc, docx
    Document,
}

impl MediaCategory {
    /// Message kind a transcript line gets when it references this category.
    ///
    /// Documents have no dedicated layout and stay text.
    pub fn message_kind(self) -> MessageKind {
        match self {
            MediaCategory::Image => MessageKind::Image,
            MediaCategory::Video => MessageKind::Video,
            MediaCategory::Audio => MessageKind::Audio,
            MediaCategory::Document => MessageKind::Text,
        }
    }
}

/// (extension, MIME type, category), lowercase.
const MEDIA_TYPES: &[(&str, &str, MediaCategory)] = &[
    ("jpg", "image/jpeg", MediaCategory::Image),
    ("jpeg", "image/jpeg", MediaCategory::Image),
    ("png", "image/png", MediaCategory::Image),
    ("gif", "image/gif", MediaCategory::Image),
    ("webp", "image/webp", MediaCategory::Image),
    ("mp4", "video/mp4", MediaCategory::Video),
    ("mov", "video/quicktime", MediaCategory::Video),
    ("avi", "video/x-msvideo", MediaCategory::Video),
    ("3gp", "video/3gpp", MediaCategory::Video),
    ("opus", "audio/opus", MediaCategory::Audio),
    ("aac", "audio/aac", MediaCategory::Audio),
    ("m4a", "audio/mp4", MediaCategory::Audio),
    ("mp3", "audio/mpeg", MediaCategory::Audio),
    ("wav", "audio/wav", MediaCategory::Audio),
    ("pdf", "application/pdf", MediaCategory::Document),
    ("doc", "application/msword", MediaCategory::Document),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        MediaCategory::Document,
    ),
];

/// Extension that marks an archive entry as the chat transcript.
pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// Regex alternation of every known extension, for use in patterns.
pub const EXTENSION_ALTERNATION: &str =
    "jpg|jpeg|png|gif|webp|mp4|mov|avi|3gp|opus|aac|m4a|mp3|wav|pdf|doc|docx";

/// Looks up MIME type and category for an extension (case-insensitive, no dot).
pub fn media_type_for_extension(ext: &str) -> Option<(&'static str, MediaCategory)> {
    MEDIA_TYPES
        .iter()
        .find(|(known, _, _)| known.eq_ignore_ascii_case(ext))
        .map(|&(_, mime, category)| (mime, category))
}

/// Looks up the MIME type for an extension.
pub fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
    media_type_for_extension(ext).map(|(mime, _)| mime)
}

/// Returns the extension of a file name (text after the last dot).
pub fn extension_of(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Looks up MIME type and category for a file name.
pub fn media_type_for_filename(filename: &str) -> Option<(&'static str, MediaCategory)> {
    extension_of(filename).and_then(media_type_for_extension)
}
