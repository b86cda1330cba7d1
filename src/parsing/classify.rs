//! Content/type classification of a message body.
//!
//! A body becomes a media message when it contains an "omitted" phrase, an
//! attachment marker, or ends with a file name whose extension is in the
//! media table. The file name and the markers are removed from the body; what
//! remains is the caption.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ParserConfig;
use crate::media::{EXTENSION_ALTERNATION, MediaCategory, media_type_for_filename};
use crate::message::MessageKind;

use super::notice::strip_direction_mark;

/// Which kind an "omitted" phrase stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhraseKind {
    /// Says nothing about the kind; decided by [`ParserConfig`].
    Generic,
    Specific(MessageKind),
}

/// Omitted-media phrases, English and French, most specific first.
const OMITTED_PHRASES: &[(&str, PhraseKind)] = &[
    (r"<Media omitted>", PhraseKind::Generic),
    (r"<Média omis>", PhraseKind::Generic),
    (r"image omitted", PhraseKind::Specific(MessageKind::Image)),
    (r"photo omise", PhraseKind::Specific(MessageKind::Image)),
    (r"video omitted", PhraseKind::Specific(MessageKind::Video)),
    (r"vidéo omise", PhraseKind::Specific(MessageKind::Video)),
    (r"audio omitted", PhraseKind::Specific(MessageKind::Audio)),
    (r"audio omis", PhraseKind::Specific(MessageKind::Audio)),
    (r"média omis", PhraseKind::Generic),
];

static PHRASES: LazyLock<Vec<(Regex, PhraseKind)>> = LazyLock::new(|| {
    OMITTED_PHRASES
        .iter()
        .map(|&(phrase, kind)| {
            let regex = Regex::new(&format!("(?i){}", regex::escape(phrase)))
                .expect("omitted phrase must compile");
            (regex, kind)
        })
        .collect()
});

static ATTACHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<attached:\s*[^>]*>|\((?:file attached|fichier joint)\)")
        .expect("attachment marker pattern must compile")
});

static ENDS_WITH_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\S\.(?:{EXTENSION_ALTERNATION})$"))
        .expect("file suffix pattern must compile")
});

static FILE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)([^\s<>]+\.(?:{EXTENSION_ALTERNATION}))(?:$|[\s>)])"
    ))
    .expect("file token pattern must compile")
});

/// Result of classifying one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Message kind.
    pub kind: MessageKind,
    /// Caption or text.
    pub content: String,
    /// Referenced file name, when the body carried one.
    pub media_filename: Option<String>,
}

impl Classification {
    fn text(content: &str) -> Self {
        Self {
            kind: MessageKind::Text,
            content: content.to_string(),
            media_filename: None,
        }
    }
}

fn find_phrase(text: &str) -> Option<PhraseKind> {
    PHRASES
        .iter()
        .find(|(regex, _)| regex.is_match(text))
        .map(|&(_, kind)| kind)
}

/// Removes markers and phrases, collapsing the whitespace left behind.
fn clean_caption(text: &str) -> String {
    let mut caption = ATTACHED.replace_all(text, " ").into_owned();
    for (regex, _) in PHRASES.iter() {
        caption = regex.replace_all(&caption, " ").into_owned();
    }
    caption.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classifies a message body.
///
/// Bodies that are not media references come back unchanged as text.
pub fn classify_body(body: &str, config: &ParserConfig) -> Classification {
    let (text, _) = strip_direction_mark(body.trim());

    let phrase = find_phrase(text);
    let attached = ATTACHED.is_match(text);
    if phrase.is_none() && !attached && !ENDS_WITH_FILE.is_match(text) {
        return Classification::text(text);
    }

    if let Some(token) = FILE_TOKEN.captures(text).and_then(|caps| caps.get(1)) {
        let filename = token.as_str().to_string();
        let category = media_type_for_filename(&filename).map(|(_, category)| category);
        let kind = category.map_or(MessageKind::Text, MediaCategory::message_kind);

        let mut rest = String::with_capacity(text.len());
        rest.push_str(&text[..token.start()]);
        rest.push(' ');
        rest.push_str(&text[token.end()..]);
        let caption = clean_caption(&rest);

        let content = if !caption.is_empty() {
            caption
        } else if let Some(default) = kind.default_caption() {
            default.to_string()
        } else {
            // A document with no text: its name is the only thing to show.
            filename.clone()
        };

        return Classification {
            kind,
            content,
            media_filename: Some(filename),
        };
    }

    match phrase {
        Some(PhraseKind::Generic) => Classification {
            kind: config.generic_media_kind,
            content: config.generic_media_caption.clone(),
            media_filename: None,
        },
        Some(PhraseKind::Specific(kind)) => {
            let caption = clean_caption(text);
            let content = if caption.is_empty() {
                kind.default_caption().unwrap_or_default().to_string()
            } else {
                caption
            };
            Classification {
                kind,
                content,
                media_filename: None,
            }
        }
        // An attachment marker naming a file outside the media table.
        None => Classification::text(text),
    }
}
