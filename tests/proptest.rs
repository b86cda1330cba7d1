//! Property-based tests for chatbook.
//!
//! These tests generate random transcripts and media sets to find edge cases.

use proptest::prelude::*;

use chatbook::archive::{MediaLibrary, MediaPayload};
use chatbook::config::{BookSettings, ResolverConfig};
use chatbook::parser::TranscriptParser;
use chatbook::parsers::WhatsAppParser;
use chatbook::render::{BookRenderer, escape_html};
use chatbook::resolver::MediaResolver;
use chatbook::{MessageKind, ParsedMessage};
use chrono::{TimeZone, Utc};

/// One transcript line as (day, hour, minute, sender, body, grammar).
fn arb_line() -> impl Strategy<Value = String> {
    (
        1u32..=28,
        0u32..24,
        0u32..60,
        // Fast: select from predefined senders
        prop::sample::select(vec!["Alice", "Bob", "Chloé", "Иван", "村上"]),
        prop::sample::select(vec![
            "Hello",
            "Привет мир",
            "🎉🔥 emoji",
            "<Media omitted>",
            "IMG-0001.jpg (file attached)",
            "VID-0002.mp4",
            "audio omitted",
            "Security code changed",
            "a: b: c",
            "<b>&amp;</b>",
        ]),
        0usize..3,
    )
        .prop_map(|(day, hour, minute, sender, body, grammar)| match grammar {
            0 => format!("[{day:02}/05/2023, {hour:02}:{minute:02}:00] {sender}: {body}"),
            1 => format!("{day:02}/05/2023, {hour:02}:{minute:02}:00 - {sender}: {body}"),
            _ => format!("{day}/5/23 {hour}:{minute:02} - {sender}: {body}"),
        })
}

fn arb_transcript(max_lines: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            8 => arb_line(),
            1 => Just("garbage without a timestamp".to_string()),
            1 => Just(String::new()),
        ],
        0..max_lines,
    )
    .prop_map(|lines| lines.join("\n"))
}

fn library(count: usize) -> MediaLibrary {
    let mut library = MediaLibrary::new();
    for i in 0..count {
        let name = format!("P{i}.jpg");
        let payload = MediaPayload::for_filename(&name, vec![0xFF, 0xD8, i as u8]).unwrap();
        library.insert(name, payload);
    }
    library
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================
    // PARSER PROPERTIES
    // ============================================

    /// Parsed messages are sorted by timestamp
    #[test]
    fn parsed_messages_are_sorted(transcript in arb_transcript(40)) {
        let messages = WhatsAppParser::new().parse_str(&transcript).into_messages();
        for pair in messages.windows(2) {
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    /// Every matched line is either a message or a notice
    #[test]
    fn matched_lines_are_accounted_for(transcript in arb_transcript(40)) {
        let outcome = WhatsAppParser::new().parse_str(&transcript);
        let non_empty = transcript.lines().filter(|l| !l.trim().is_empty()).count();
        prop_assert_eq!(
            outcome.messages.len() + outcome.system_notices + outcome.unmatched_lines + outcome.warnings.len(),
            non_empty
        );
    }

    /// Security code notices never survive parsing
    #[test]
    fn security_notices_never_survive(transcript in arb_transcript(40)) {
        let messages = WhatsAppParser::new().parse_str(&transcript).into_messages();
        prop_assert!(messages.iter().all(|m| m.content != "Security code changed"));
    }

    /// Media messages always carry a non-empty caption
    #[test]
    fn media_messages_have_captions(transcript in arb_transcript(40)) {
        let messages = WhatsAppParser::new().parse_str(&transcript).into_messages();
        for m in messages.iter().filter(|m| m.kind.is_media()) {
            prop_assert!(!m.content.trim().is_empty());
        }
    }

    /// Parser never panics on arbitrary text
    #[test]
    fn parser_never_panics(text in "\\PC{0,200}") {
        let _ = WhatsAppParser::new().parse_str(&text);
    }

    // ============================================
    // RESOLVER PROPERTIES
    // ============================================

    /// Unresolved image messages take pool images strictly in order
    #[test]
    fn fallback_pairs_in_order(messages in 0usize..12, images in 0usize..12) {
        let ts = Utc.with_ymd_and_hms(2023, 5, 12, 14, 0, 0).unwrap();
        let parsed: Vec<ParsedMessage> = (0..messages)
            .map(|_| ParsedMessage::new(ts, "Alice", "Photo partagée").with_kind(MessageKind::Image))
            .collect();
        let lib = library(images);

        let resolved = MediaResolver::with_config(ResolverConfig::sequential()).resolve(parsed, &lib);

        for (i, message) in resolved.iter().enumerate() {
            if i < images {
                let expected = format!("P{i}.jpg");
                prop_assert_eq!(message.media_file_name.as_deref(), Some(expected.as_str()));
                prop_assert!(message.has_image());
            } else {
                prop_assert!(!message.has_image());
            }
        }
    }

    /// Parallel encoding yields exactly the sequential result
    #[test]
    fn parallel_matches_sequential(transcript in arb_transcript(30), images in 0usize..6) {
        let parsed = WhatsAppParser::new().parse_str(&transcript).into_messages();
        let lib = library(images);

        let sequential = MediaResolver::with_config(ResolverConfig::sequential())
            .resolve(parsed.clone(), &lib);
        let parallel = MediaResolver::with_config(ResolverConfig::default().with_parallel(true))
            .resolve(parsed, &lib);
        prop_assert_eq!(sequential, parallel);
    }

    /// Only image messages get inlined payloads; only video/audio get codes
    #[test]
    fn payloads_match_kinds(transcript in arb_transcript(30), images in 0usize..6) {
        let parsed = WhatsAppParser::new().parse_str(&transcript).into_messages();
        let resolved = MediaResolver::new().resolve(parsed, &library(images));

        for m in &resolved {
            if m.media_data_uri.is_some() {
                prop_assert_eq!(m.kind, MessageKind::Image);
            }
            if m.placeholder_code.is_some() {
                prop_assert!(matches!(m.kind, MessageKind::Video | MessageKind::Audio));
            }
        }
    }

    // ============================================
    // RENDERER PROPERTIES
    // ============================================

    /// Same input and clock give the same document
    #[test]
    fn rendering_is_deterministic(transcript in arb_transcript(30)) {
        let parsed = WhatsAppParser::new().parse_str(&transcript).into_messages();
        let messages = MediaResolver::new().resolve(parsed, &library(2));
        let settings = BookSettings::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let renderer = BookRenderer::new();
        let first = renderer.render_at(&messages, &settings, now).unwrap();
        let second = renderer.render_at(&messages, &settings, now).unwrap();
        prop_assert_eq!(first, second);
    }

    /// One message block per message
    #[test]
    fn every_message_is_rendered(transcript in arb_transcript(30)) {
        let parsed = WhatsAppParser::new().parse_str(&transcript).into_messages();
        let messages = MediaResolver::new().resolve(parsed, &MediaLibrary::new());
        let html = BookRenderer::new().render(&messages, &BookSettings::default()).unwrap();

        for m in &messages {
            let anchor = format!("id=\"{}\"", m.id);
            prop_assert!(html.contains(&anchor));
        }
    }

    /// Escaped text contains no markup characters
    #[test]
    fn escaped_text_has_no_markup(text in "\\PC{0,100}") {
        let escaped = escape_html(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
    }
}
