//! HTML sections of the book.
//!
//! Plain string building, no template engine. Every piece of user text
//! (messages, senders, file names, settings) goes through [`escape_html`].

use chrono::{DateTime, Datelike, Locale, NaiveDate, Utc};

use crate::config::BookSettings;
use crate::message::{Message, MessageKind};

use super::stats::BookStats;

/// Remote service that draws instruction codes for missing photos.
pub const INSTRUCTION_CODE_SERVICE: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Escapes HTML special characters, for text and attribute values alike.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Everything a section needs besides the messages.
pub(crate) struct Page<'a> {
    pub settings: &'a BookSettings,
    pub stats: &'a BookStats,
    pub primary: Option<&'a str>,
    pub locale: Locale,
    pub year: i32,
}

pub(crate) fn document(messages: &[Message], page: &Page<'_>, css: &str) -> String {
    let mut html = String::with_capacity(8192 + messages.len() * 512);

    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!(
        "<html lang=\"{}\">\n",
        escape_html(page.settings.language())
    ));
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!(
        "<title>{}</title>\n",
        escape_html(&page.settings.title)
    ));
    html.push_str(&format!("<style>{css}</style>\n"));
    html.push_str("</head>\n<body>\n");

    html.push_str(&cover(page));
    if let Some(section) = preface(page.settings) {
        html.push_str(&section);
    }
    if let Some(section) = dedication(page.settings) {
        html.push_str(&section);
    }
    html.push_str(&conversation(messages, page));

    html.push_str("</body>\n</html>\n");
    html
}

fn cover(page: &Page<'_>) -> String {
    let settings = page.settings;
    let stats = page.stats;
    let mut html = String::from("<section class=\"cover\">\n");

    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&settings.title)));
    if !settings.authors.trim().is_empty() {
        html.push_str(&format!(
            "<div class=\"author\">par {}</div>\n",
            escape_html(settings.authors.trim())
        ));
    }
    if let Some(image) = &settings.cover_image {
        html.push_str(&format!(
            "<img class=\"cover-image\" src=\"{}\" alt=\"Image de couverture\">\n",
            escape_html(image)
        ));
    }
    html.push_str(&format!(
        "<div class=\"stats\">{} messages<br>{} photos • {} vidéos • {} audios<br>{}</div>\n",
        stats.messages, stats.photos, stats.videos, stats.audios, page.year
    ));

    html.push_str("</section>\n");
    html
}

fn preface(settings: &BookSettings) -> Option<String> {
    if settings.preface.trim().is_empty() {
        return None;
    }

    let mut html = String::from("<section class=\"preface\">\n<h2>Préface</h2>\n");
    for paragraph in settings.preface.lines() {
        html.push_str(&format!("<p>{}</p>\n", escape_html(paragraph)));
    }
    html.push_str("</section>\n");
    Some(html)
}

fn dedication(settings: &BookSettings) -> Option<String> {
    if settings.dedication.trim().is_empty() {
        return None;
    }

    Some(format!(
        "<section class=\"dedication\">\n<h2>Dédicace</h2>\n<p>{}</p>\n</section>\n",
        escape_html(&settings.dedication)
    ))
}

fn conversation(messages: &[Message], page: &Page<'_>) -> String {
    let mut html = String::from(
        "<section class=\"messages-section\">\n<h2>Nos Conversations</h2>\n<div class=\"conversation\">\n",
    );

    let mut current_day: Option<NaiveDate> = None;
    for message in messages {
        let day = message.timestamp.date_naive();
        if current_day != Some(day) {
            current_day = Some(day);
            html.push_str(&date_separator(message.timestamp, page.locale));
        }

        let mine = page.primary == Some(message.sender.as_str());
        html.push_str(&message_block(message, mine, page.settings));
    }

    html.push_str("</div>\n</section>\n");
    html
}

fn date_separator(timestamp: DateTime<Utc>, locale: Locale) -> String {
    let day = timestamp.date_naive();
    let label = timestamp.format_localized("%A %-d %B %Y", locale).to_string();
    format!(
        "<div class=\"date-separator\" data-date=\"{:04}-{:02}-{:02}\"><span>{}</span></div>\n",
        day.year(),
        day.month(),
        day.day(),
        escape_html(&label)
    )
}

fn message_block(message: &Message, mine: bool, settings: &BookSettings) -> String {
    let side = if mine { "mine" } else { "theirs" };
    let mut html = format!(
        "<div class=\"message {side} {kind}\" id=\"{id}\">\n<div class=\"message-inner\">\n",
        kind = message.kind,
        id = escape_html(&message.id),
    );

    if !mine {
        html.push_str(&format!(
            "<div class=\"sender\">{}</div>\n",
            escape_html(&message.sender)
        ));
    }

    html.push_str("<div class=\"bubble\">\n");

    let show_content = !message.content.trim().is_empty()
        && !(message.kind.is_media() && message.has_default_caption());
    if show_content {
        html.push_str(&format!(
            "<div class=\"content\">{}</div>\n",
            escape_html(&message.content)
        ));
    }

    if let Some(media) = media_block(message, settings) {
        html.push_str(&media);
    }

    html.push_str(&format!(
        "<div class=\"time\">{}</div>\n",
        message.timestamp.format("%H:%M")
    ));
    html.push_str("</div>\n</div>\n</div>\n");
    html
}

fn file_name_line(message: &Message) -> String {
    message
        .media_file_name
        .as_deref()
        .map(|name| {
            format!(
                "<p class=\"file-name\">📎 {}</p>\n",
                escape_html(name)
            )
        })
        .unwrap_or_default()
}

fn media_block(message: &Message, settings: &BookSettings) -> Option<String> {
    let block = match message.kind {
        MessageKind::Text => return None,
        MessageKind::Image => image_block(message, settings),
        MessageKind::Video => video_block(message),
        MessageKind::Audio => audio_block(message),
    };
    Some(format!("<div class=\"media\">\n{block}</div>\n"))
}

fn image_block(message: &Message, settings: &BookSettings) -> String {
    if let Some(uri) = &message.media_data_uri {
        return format!(
            "<img class=\"photo\" src=\"{}\" alt=\"Photo partagée\">\n{}",
            escape_html(uri),
            file_name_line(message)
        );
    }

    let code = if settings.remote_instruction_codes {
        format!(
            "<div class=\"code\"><img src=\"{}\" alt=\"Code d'instructions\"></div>\n",
            escape_html(&instruction_code_url(message))
        )
    } else {
        String::new()
    };

    format!(
        "<div class=\"media-card unavailable\">\n\
         <span class=\"icon\">🖼️</span>\n\
         <div>\n<p class=\"label\">Photo</p>\n<p class=\"hint\">Photo non disponible</p>\n</div>\n\
         {code}</div>\n"
    )
}

/// Remote code image telling the reader which file to look for.
pub fn instruction_code_url(message: &Message) -> String {
    let name = message
        .media_filename
        .as_deref()
        .unwrap_or(message.kind.as_str());
    let text = format!(
        "Fichier: {name}\nType: {}\nScannez pour voir/télécharger ce média.",
        message.kind
    );
    format!(
        "{INSTRUCTION_CODE_SERVICE}?size=200x200&data={}&bgcolor=ffffff&color=000000",
        encode_uri_component(&text)
    )
}

fn video_block(message: &Message) -> String {
    let code = match &message.placeholder_code {
        Some(code) => format!(
            "<div class=\"code\"><img src=\"{}\" alt=\"QR Code vidéo\"></div>\n",
            escape_html(code)
        ),
        None => "<p class=\"hint\">QR code indisponible</p>\n".to_string(),
    };
    let class = if message.placeholder_code.is_some() {
        "media-card"
    } else {
        "media-card unavailable"
    };

    format!(
        "<div class=\"{class}\">\n\
         <span class=\"icon\">🎥</span>\n\
         <div>\n<p class=\"label\">Vidéo</p>\n{}<p class=\"hint\">Scanner le QR code pour accéder à la vidéo</p>\n</div>\n\
         {code}</div>\n",
        file_name_line(message)
    )
}

fn audio_block(message: &Message) -> String {
    let link = match &message.media_locator {
        Some(locator) => format!(
            "<a class=\"audio-link\" href=\"{}\">🔊 Écouter l'audio</a>\n",
            escape_html(locator)
        ),
        None => "<span class=\"audio-link disabled\" aria-disabled=\"true\">🔊 Audio non disponible</span>\n"
            .to_string(),
    };

    format!(
        "<div class=\"media-card\">\n\
         <span class=\"icon\">🎵</span>\n\
         <div>\n<p class=\"label\">Note vocale</p>\n{}{link}</div>\n\
         </div>\n",
        file_name_line(message)
    )
}
