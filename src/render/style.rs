//! Stylesheet of the book.
//!
//! The fixed rules live in [`BASE_STYLES`]; everything that depends on
//! [`BookSettings`] is passed in as CSS custom properties on `:root`.

use crate::config::BookSettings;

/// Remote stylesheet for the Inter and Dancing Script web fonts.
pub const WEB_FONTS_URL: &str = "https://fonts.googleapis.com/css2?family=Dancing+Script:wght@400;600;700&family=Inter:wght@300;400;500;600;700&display=swap";

const BASE_STYLES: &str = r#"
    * {
        box-sizing: border-box;
    }
    body {
        font-family: var(--book-font);
        font-size: var(--book-text-size);
        line-height: 1.6;
        margin: 0;
        padding: 20px;
        color: #1f2937;
        background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
        min-height: 100vh;
    }
    .cover {
        background: var(--cover-color);
        color: white;
        text-align: center;
        padding: 80px 40px;
        margin-bottom: 40px;
        border-radius: 20px;
        page-break-after: always;
        box-shadow: 0 20px 40px rgba(0,0,0,0.25);
    }
    .cover h1 {
        font-size: 48px;
        margin-bottom: 24px;
        font-weight: 700;
        text-shadow: 0 4px 8px rgba(0,0,0,0.3);
        letter-spacing: -0.02em;
    }
    .cover .cover-image {
        max-width: 320px;
        max-height: 320px;
        border-radius: 16px;
        margin: 0 auto 32px;
        display: block;
        box-shadow: 0 8px 20px rgba(0,0,0,0.3);
    }
    .cover .author {
        font-size: 24px;
        opacity: 0.95;
        margin-bottom: 32px;
    }
    .cover .stats {
        font-size: 18px;
        opacity: 0.85;
        margin-top: 40px;
        line-height: 1.8;
    }
    .preface, .dedication, .messages-section {
        margin-bottom: 40px;
        padding: 40px;
        background: linear-gradient(135deg, #ffffff 0%, #f8fafc 100%);
        border-radius: 20px;
        box-shadow: 0 12px 28px rgba(0,0,0,0.1);
    }
    .preface, .dedication {
        page-break-after: always;
    }
    .preface h2, .dedication h2, .messages-section h2 {
        color: #7c3aed;
        margin-bottom: 24px;
        font-size: 32px;
        text-align: center;
        font-weight: 700;
    }
    .preface p {
        margin-bottom: 20px;
        text-align: justify;
        line-height: 1.8;
    }
    .dedication p {
        font-style: italic;
        text-align: center;
        font-size: 22px;
        line-height: 1.7;
        color: #7c3aed;
    }
    .conversation {
        background: linear-gradient(to bottom, #f8fafc, #e2e8f0);
        border-radius: 16px;
        padding: 32px;
    }
    .date-separator {
        text-align: center;
        margin: 24px 0;
    }
    .date-separator span {
        display: inline-block;
        background: white;
        color: #374151;
        font-size: 14px;
        padding: 4px 16px;
        border-radius: 9999px;
        border: 1px solid #e5e7eb;
        box-shadow: 0 1px 2px rgba(0,0,0,0.05);
    }
    .message {
        display: flex;
        margin-bottom: 16px;
        page-break-inside: avoid;
    }
    .message.mine {
        justify-content: flex-end;
    }
    .message.theirs {
        justify-content: flex-start;
    }
    .message-inner {
        max-width: 70%;
        min-width: 180px;
    }
    .sender {
        font-size: 12px;
        color: #7c3aed;
        font-weight: 700;
        margin: 0 0 6px 12px;
    }
    .bubble {
        border-radius: 24px;
        padding: 16px 20px;
        box-shadow: 0 4px 12px rgba(0,0,0,0.15);
        overflow-wrap: break-word;
    }
    .mine .bubble {
        background: var(--bubble-user);
        color: var(--bubble-user-text);
        border-bottom-right-radius: 8px;
    }
    .theirs .bubble {
        background: var(--bubble-other);
        color: var(--bubble-other-text);
        border: 1px solid #e2e8f0;
        border-bottom-left-radius: 8px;
    }
    .content {
        white-space: pre-wrap;
        font-weight: 500;
    }
    .content + .media {
        margin-top: 12px;
    }
    .time {
        font-size: 11px;
        opacity: 0.7;
        text-align: right;
        margin-top: 6px;
    }
    .media img.photo {
        width: 100%;
        max-height: 300px;
        object-fit: cover;
        display: block;
        border-radius: 12px;
    }
    .media .file-name {
        font-size: 10px;
        opacity: 0.8;
        margin: 6px 0 0 0;
        text-align: center;
    }
    .media-card {
        padding: 16px;
        border-radius: 12px;
        display: flex;
        align-items: center;
        gap: 12px;
        background: rgba(127,127,127,0.08);
        border: 2px solid rgba(127,127,127,0.25);
    }
    .media-card.unavailable {
        border-style: dashed;
    }
    .media-card .icon {
        font-size: 20px;
        flex-shrink: 0;
    }
    .media-card .label {
        font-size: 13px;
        font-weight: 700;
        margin: 0 0 4px 0;
    }
    .media-card .hint {
        font-size: 11px;
        opacity: 0.75;
        margin: 0;
    }
    .media-card .code {
        background: white;
        padding: 6px;
        border-radius: 8px;
        flex-shrink: 0;
    }
    .media-card .code img {
        width: 80px;
        height: 80px;
        display: block;
    }
    .audio-link {
        display: inline-block;
        margin-top: 8px;
        background: #2563eb;
        color: white;
        padding: 8px 16px;
        border-radius: 20px;
        text-decoration: none;
        font-size: 12px;
        font-weight: 600;
    }
    .audio-link.disabled {
        background: #6b7280;
        cursor: not-allowed;
        pointer-events: none;
    }
    img {
        max-width: 100%;
        height: auto;
    }
    @media print {
        body {
            background: white;
            padding: 10px;
        }
    }
    @media screen and (max-width: 768px) {
        body {
            padding: 10px;
        }
        .cover {
            padding: 40px 20px;
        }
        .cover h1 {
            font-size: 32px;
        }
        .messages-section, .conversation {
            padding: 16px;
        }
    }
"#;

/// Black or white, whichever reads better on a `#rgb`/`#rrggbb` background.
pub fn contrast_text(background: &str) -> &'static str {
    let hex = background.trim_start_matches('#');
    if !hex.is_ascii() {
        return "#1f2937";
    }
    let channel = |i: usize| -> Option<f64> {
        let value = match hex.len() {
            3 => u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok()?,
            6 | 8 => u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?,
            _ => return None,
        };
        Some(f64::from(value))
    };

    match (channel(0), channel(1), channel(2)) {
        (Some(r), Some(g), Some(b)) => {
            let luminance = 0.299 * r + 0.587 * g + 0.114 * b;
            if luminance > 160.0 { "#1f2937" } else { "#ffffff" }
        }
        _ => "#1f2937",
    }
}

/// Full stylesheet for the given settings.
///
/// Colors are interpolated as-is; callers validate settings first.
pub fn stylesheet(settings: &BookSettings) -> String {
    let mut css = String::with_capacity(BASE_STYLES.len() + 512);

    if settings.web_fonts {
        css.push_str(&format!("\n    @import url('{WEB_FONTS_URL}');\n"));
    }

    css.push_str(&format!(
        "    :root {{\n        \
         --book-font: {font};\n        \
         --book-text-size: {size};\n        \
         --cover-color: {cover};\n        \
         --bubble-user: {user};\n        \
         --bubble-user-text: {user_text};\n        \
         --bubble-other: {other};\n        \
         --bubble-other-text: {other_text};\n    \
         }}\n",
        font = settings.font_family.css(),
        size = settings.text_size.css(),
        cover = settings.cover_color,
        user = settings.bubble_color_user,
        user_text = contrast_text(&settings.bubble_color_user),
        other = settings.bubble_color_other,
        other_text = contrast_text(&settings.bubble_color_other),
    ));

    css.push_str(BASE_STYLES);
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FontFamily, TextSize};

    #[test]
    fn test_contrast_text() {
        assert_eq!(contrast_text("#8B5CF6"), "#ffffff");
        assert_eq!(contrast_text("#ffffff"), "#1f2937");
        assert_eq!(contrast_text("#000"), "#ffffff");
        assert_eq!(contrast_text("#fff"), "#1f2937");
        assert_eq!(contrast_text("not a color"), "#1f2937");
    }

    #[test]
    fn test_stylesheet_variables() {
        let settings = BookSettings::default()
            .with_text_size(TextSize::Large)
            .with_font_family(FontFamily::Script)
            .with_cover_color("#EC4899");
        let css = stylesheet(&settings);
        assert!(css.contains("--book-text-size: 18px;"));
        assert!(css.contains("--book-font: \"Dancing Script\", cursive;"));
        assert!(css.contains("--cover-color: #EC4899;"));
        assert!(css.contains("--bubble-user-text: #ffffff;"));
        assert!(css.contains(WEB_FONTS_URL));
    }

    #[test]
    fn test_web_fonts_optional() {
        let css = stylesheet(&BookSettings::default().with_web_fonts(false));
        assert!(!css.contains("@import"));
        assert!(!css.contains("googleapis"));
    }
}
