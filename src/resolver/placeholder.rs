//! Inline encodings: image data URIs and scannable placeholder codes.

use base64ct::{Base64, Encoding};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use crate::archive::MediaEntry;
use crate::config::ResolverConfig;
use crate::error::MediaError;
use crate::message::MessageKind;

/// Local locator for a media file that is not embedded, e.g. `#video-clip.mp4`.
///
/// No network address is ever produced; the archive never leaves the device.
pub fn placeholder_locator(kind: MessageKind, filename: Option<&str>) -> String {
    format!("#{}-{}", kind.as_str(), filename.unwrap_or("file"))
}

/// Text encoded into a placeholder code.
pub fn placeholder_text(kind: MessageKind, filename: Option<&str>, locator: &str) -> String {
    let name = filename.map_or_else(|| format!("{}_file", kind.as_str()), str::to_string);
    format!("Fichier: {name}\nTéléchargement direct: {locator}")
}

/// Renders `text` as a QR code and returns it as an SVG `data:` URI.
pub fn generate_placeholder_code(text: &str, config: &ResolverConfig) -> Result<String, MediaError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
        .map_err(|e| MediaError::PlaceholderCode(e.to_string()))?;

    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(config.code_size, config.code_size)
        .dark_color(svg::Color(&config.code_dark_color))
        .light_color(svg::Color(&config.code_light_color))
        .build();

    Ok(format!(
        "data:image/svg+xml;base64,{}",
        Base64::encode_string(image.as_bytes())
    ))
}

/// Encodes an image entry as a base64 `data:` URI.
pub fn encode_data_uri(entry: &MediaEntry, max_bytes: usize) -> Result<String, MediaError> {
    let payload = &entry.payload;
    if !payload.mime_type.starts_with("image/") {
        return Err(MediaError::NotAnImage {
            filename: entry.filename.clone(),
            mime: payload.mime_type.to_string(),
        });
    }
    if payload.bytes.is_empty() {
        return Err(MediaError::EmptyPayload {
            filename: entry.filename.clone(),
        });
    }
    if payload.bytes.len() > max_bytes {
        return Err(MediaError::TooLarge {
            filename: entry.filename.clone(),
            size: payload.bytes.len(),
            max: max_bytes,
        });
    }

    Ok(format!(
        "data:{};base64,{}",
        payload.mime_type,
        Base64::encode_string(&payload.bytes)
    ))
}
