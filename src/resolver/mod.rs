//! Media resolution: pairs parsed messages with archive payloads.
//!
//! Resolution runs in two passes:
//!
//! 1. **Assignment** (sequential). Every image message is matched against the
//!    [`ImageIndex`] by exact name, then by substring, then gets the next
//!    image from the [`FallbackPool`]. This is the only step that touches
//!    the pool, so pairing is deterministic.
//! 2. **Encoding** (parallel with the `parallel` feature). Assigned images are
//!    base64-encoded and video/audio messages get a placeholder code. Each
//!    item only reads its own assignment, and failures stay local.
//!
//! # Example
//!
//! ```rust
//! use chatbook::archive::{MediaLibrary, MediaPayload};
//! use chatbook::parser::TranscriptParser;
//! use chatbook::parsers::WhatsAppParser;
//! use chatbook::resolver::MediaResolver;
//!
//! let mut media = MediaLibrary::new();
//! media.insert("IMG-1.jpg", MediaPayload::for_filename("IMG-1.jpg", vec![0xFF, 0xD8]).unwrap());
//!
//! let parsed = WhatsAppParser::new()
//!     .parse_str("12/05/23 14:03 - Alice: IMG-1.jpg (file attached)")
//!     .into_messages();
//! let messages = MediaResolver::new().resolve(parsed, &media);
//!
//! assert!(messages[0].media_data_uri.as_deref().unwrap().starts_with("data:image/jpeg;base64,"));
//! ```

mod index;
mod placeholder;

pub use index::{FallbackPool, ImageIndex, MatchKind, strip_export_prefix};
pub use placeholder::{
    encode_data_uri, generate_placeholder_code, placeholder_locator, placeholder_text,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::archive::{MediaEntry, MediaLibrary};
use crate::config::ResolverConfig;
use crate::error::MediaError;
use crate::message::{Message, MessageKind, ParsedMessage};

/// Counts from one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Images found by exact name
    pub exact: usize,
    /// Images found by substring
    pub substring: usize,
    /// Images taken from the fallback pool
    pub fallback: usize,
    /// Image messages left without a payload
    pub missing: usize,
    /// Images inlined as data URIs
    pub inlined: usize,
    /// Placeholder codes generated
    pub codes: usize,
    /// Payloads or codes that failed to encode
    pub failed: usize,
}

impl ResolveReport {
    /// Images that ended up inlined.
    pub fn resolved_images(&self) -> usize {
        self.inlined
    }
}

/// Messages plus the counts that produced them.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Resolved messages, in input order
    pub messages: Vec<Message>,
    /// What happened along the way
    pub report: ResolveReport,
}

/// What the assignment pass decided for one message.
#[derive(Debug, Clone, Copy)]
enum Assignment<'a> {
    Nothing,
    Image(&'a MediaEntry, MatchKind),
    MissingImage,
    Placeholder,
}

#[derive(Debug)]
struct Job<'a> {
    index: usize,
    parsed: ParsedMessage,
    assignment: Assignment<'a>,
}

/// Result of encoding one job.
enum Encoded {
    Nothing,
    Inlined,
    Code,
    Failed,
}

/// Resolves media references of parsed messages.
#[derive(Debug, Clone, Default)]
pub struct MediaResolver {
    config: ResolverConfig,
}

impl MediaResolver {
    /// Creates a resolver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with custom configuration.
    pub fn with_config(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves every message. Never fails; missing media degrade to
    /// messages without a payload.
    pub fn resolve(&self, parsed: Vec<ParsedMessage>, library: &MediaLibrary) -> Vec<Message> {
        self.resolve_with_report(parsed, library).messages
    }

    /// Like [`resolve`](Self::resolve), also returning match counts.
    pub fn resolve_with_report(
        &self,
        parsed: Vec<ParsedMessage>,
        library: &MediaLibrary,
    ) -> Resolution {
        let index = ImageIndex::build(library);
        let mut pool = FallbackPool::from_library(library);

        let jobs = assign(parsed, &index, &mut pool);

        let mut report = ResolveReport::default();
        for job in &jobs {
            match job.assignment {
                Assignment::Image(_, MatchKind::Exact) => report.exact += 1,
                Assignment::Image(_, MatchKind::Substring) => report.substring += 1,
                Assignment::Image(_, MatchKind::Fallback) => report.fallback += 1,
                Assignment::MissingImage => report.missing += 1,
                Assignment::Nothing | Assignment::Placeholder => {}
            }
        }

        let encoded = self.encode_all(jobs);

        let mut messages = Vec::with_capacity(encoded.len());
        for (message, result) in encoded {
            match result {
                Encoded::Nothing => {}
                Encoded::Inlined => report.inlined += 1,
                Encoded::Code => report.codes += 1,
                Encoded::Failed => report.failed += 1,
            }
            messages.push(message);
        }

        info!(
            messages = messages.len(),
            exact = report.exact,
            substring = report.substring,
            fallback = report.fallback,
            missing = report.missing,
            failed = report.failed,
            unused_images = pool.remaining(),
            "resolved media"
        );

        Resolution { messages, report }
    }

    fn encode_all(&self, jobs: Vec<Job<'_>>) -> Vec<(Message, Encoded)> {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                return jobs.into_par_iter().map(|job| self.encode(job)).collect();
            }
        }

        jobs.into_iter().map(|job| self.encode(job)).collect()
    }

    fn encode(&self, job: Job<'_>) -> (Message, Encoded) {
        let kind = job.parsed.kind;
        let mut message = Message::from_parsed(message_id(job.index), job.parsed);

        let result = match job.assignment {
            Assignment::Nothing | Assignment::MissingImage => Encoded::Nothing,
            Assignment::Image(entry, _) => {
                message.media_file_name = Some(entry.filename.clone());
                match encode_data_uri(entry, self.config.max_inline_bytes) {
                    Ok(uri) => {
                        message.media_data_uri = Some(uri);
                        Encoded::Inlined
                    }
                    Err(e) => {
                        report_failure(&message, &e);
                        Encoded::Failed
                    }
                }
            }
            Assignment::Placeholder => {
                let filename = message.media_filename.as_deref();
                let locator = placeholder_locator(kind, filename);
                let text = placeholder_text(kind, filename, &locator);
                let result = match generate_placeholder_code(&text, &self.config) {
                    Ok(code) => {
                        message.placeholder_code = Some(code);
                        Encoded::Code
                    }
                    Err(e) => {
                        report_failure(&message, &e);
                        Encoded::Failed
                    }
                };
                message.media_locator = Some(locator);
                result
            }
        };

        (message, result)
    }
}

/// Stable id of the message at `index` in sorted order.
pub fn message_id(index: usize) -> String {
    format!("msg-{index:05}")
}

fn report_failure(message: &Message, error: &MediaError) {
    warn!(id = %message.id, kind = %message.kind, "media degraded: {error}");
}

/// Sequential pass: the only place the fallback pool is popped.
fn assign<'a>(
    parsed: Vec<ParsedMessage>,
    index: &ImageIndex<'a>,
    pool: &mut FallbackPool<'a>,
) -> Vec<Job<'a>> {
    parsed
        .into_iter()
        .enumerate()
        .map(|(i, parsed)| {
            let assignment = match parsed.kind {
                MessageKind::Text => Assignment::Nothing,
                MessageKind::Video | MessageKind::Audio => Assignment::Placeholder,
                MessageKind::Image => assign_image(&parsed, index, pool),
            };
            Job {
                index: i,
                parsed,
                assignment,
            }
        })
        .collect()
}

fn assign_image<'a>(
    parsed: &ParsedMessage,
    index: &ImageIndex<'a>,
    pool: &mut FallbackPool<'a>,
) -> Assignment<'a> {
    let named = parsed
        .media_filename
        .as_deref()
        .filter(|name| !name.is_empty())
        .and_then(|name| index.find(name));

    if let Some((entry, kind)) = named {
        debug!(wanted = ?parsed.media_filename, found = %entry.filename, ?kind, "matched image");
        return Assignment::Image(entry, kind);
    }

    match pool.take_next() {
        Some(entry) => {
            debug!(wanted = ?parsed.media_filename, found = %entry.filename, "fallback image");
            Assignment::Image(entry, MatchKind::Fallback)
        }
        None => Assignment::MissingImage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MediaPayload;
    use chrono::{TimeZone, Utc};

    fn library(names: &[&str]) -> MediaLibrary {
        let mut library = MediaLibrary::new();
        for name in names {
            let payload = MediaPayload::for_filename(name, name.as_bytes().to_vec()).unwrap();
            library.insert(*name, payload);
        }
        library
    }

    fn image(minute: u32, filename: Option<&str>) -> ParsedMessage {
        let ts = Utc.with_ymd_and_hms(2023, 5, 12, 14, minute, 0).unwrap();
        let msg = ParsedMessage::new(ts, "Alice", "Photo partagée").with_kind(MessageKind::Image);
        match filename {
            Some(name) => msg.with_media_filename(name),
            None => msg,
        }
    }

    fn resolver() -> MediaResolver {
        MediaResolver::with_config(ResolverConfig::sequential())
    }

    #[test]
    fn test_exact_match_leaves_pool() {
        let lib = library(&["A.jpg", "B.jpg"]);
        let resolution = resolver().resolve_with_report(
            vec![image(0, Some("b.JPG")), image(1, None)],
            &lib,
        );
        let m = &resolution.messages;
        assert_eq!(m[0].media_file_name.as_deref(), Some("B.jpg"));
        // pool untouched by the exact match, so the next message gets A
        assert_eq!(m[1].media_file_name.as_deref(), Some("A.jpg"));
        assert_eq!(resolution.report.exact, 1);
        assert_eq!(resolution.report.fallback, 1);
    }

    #[test]
    fn test_sequential_fallback_pairing() {
        let lib = library(&["A.jpg", "B.jpg"]);
        let messages = resolver().resolve(
            vec![image(0, Some("missing-1.jpg")), image(1, Some("missing-2.jpg"))],
            &lib,
        );
        assert_eq!(messages[0].media_file_name.as_deref(), Some("A.jpg"));
        assert_eq!(messages[1].media_file_name.as_deref(), Some("B.jpg"));
        assert!(messages[0].has_image());
        assert!(messages[1].has_image());
    }

    #[test]
    fn test_pool_exhausted() {
        let lib = library(&["A.jpg"]);
        let resolution =
            resolver().resolve_with_report(vec![image(0, None), image(1, None)], &lib);
        assert!(resolution.messages[0].has_image());
        assert!(!resolution.messages[1].has_image());
        assert_eq!(resolution.report.missing, 1);
    }

    #[test]
    fn test_substring_match() {
        let lib = library(&["IMG-20230512-WA0001.jpg"]);
        let resolution =
            resolver().resolve_with_report(vec![image(0, Some("WA0001.jpg"))], &lib);
        assert_eq!(
            resolution.messages[0].media_file_name.as_deref(),
            Some("IMG-20230512-WA0001.jpg")
        );
        assert_eq!(resolution.report.substring, 1);
    }

    #[test]
    fn test_video_and_audio_get_codes() {
        let ts = Utc.with_ymd_and_hms(2023, 5, 12, 14, 0, 0).unwrap();
        let video = ParsedMessage::new(ts, "Bob", "Vidéo partagée")
            .with_kind(MessageKind::Video)
            .with_media_filename("clip.mp4");
        let audio = ParsedMessage::new(ts, "Bob", "Note vocale").with_kind(MessageKind::Audio);

        let resolution = resolver().resolve_with_report(vec![video, audio], &MediaLibrary::new());
        let m = &resolution.messages;

        assert_eq!(m[0].media_locator.as_deref(), Some("#video-clip.mp4"));
        assert!(m[0].placeholder_code.as_deref().unwrap().starts_with("data:image/svg+xml"));
        assert!(m[0].media_data_uri.is_none());
        assert_eq!(m[1].media_locator.as_deref(), Some("#audio-file"));
        assert!(m[1].placeholder_code.is_some());
        assert_eq!(resolution.report.codes, 2);
    }

    #[test]
    fn test_text_messages_untouched() {
        let ts = Utc.with_ymd_and_hms(2023, 5, 12, 14, 0, 0).unwrap();
        let lib = library(&["A.jpg"]);
        let messages = resolver().resolve(vec![ParsedMessage::new(ts, "Alice", "hi")], &lib);
        assert_eq!(messages[0].id, "msg-00000");
        assert!(messages[0].media_data_uri.is_none());
        assert!(messages[0].placeholder_code.is_none());
        assert!(messages[0].media_file_name.is_none());
    }

    #[test]
    fn test_failed_encoding_degrades() {
        let mut lib = MediaLibrary::new();
        lib.insert("empty.jpg", MediaPayload::for_filename("empty.jpg", vec![]).unwrap());
        lib.insert("good.jpg", MediaPayload::for_filename("good.jpg", vec![1]).unwrap());

        let resolution = resolver().resolve_with_report(
            vec![image(0, Some("empty.jpg")), image(1, Some("good.jpg"))],
            &lib,
        );
        assert!(!resolution.messages[0].has_image());
        assert!(resolution.messages[1].has_image());
        assert_eq!(resolution.report.failed, 1);
        assert_eq!(resolution.report.resolved_images(), 1);
    }

    #[test]
    fn test_ids_are_sequential() {
        let lib = MediaLibrary::new();
        let messages = resolver().resolve(vec![image(0, None), image(1, None)], &lib);
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["msg-00000", "msg-00001"]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let lib = library(&["A.jpg", "B.jpg", "C.png"]);
        let ts = Utc.with_ymd_and_hms(2023, 5, 12, 14, 0, 0).unwrap();
        let input: Vec<ParsedMessage> = (0..40)
            .map(|i| match i % 3 {
                0 => image(i, None),
                1 => ParsedMessage::new(ts, "Bob", "clip")
                    .with_kind(MessageKind::Video)
                    .with_media_filename(format!("clip-{i}.mp4")),
                _ => ParsedMessage::new(ts, "Carol", format!("text {i}")),
            })
            .collect();

        let sequential = resolver().resolve(input.clone(), &lib);
        let parallel = MediaResolver::new().resolve(input, &lib);
        assert_eq!(sequential, parallel);
    }
}
