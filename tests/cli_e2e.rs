//! End-to-end CLI tests for chatbook.
//!
//! These tests run the actual binary against archives written to a temporary
//! directory and check the book it produces.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// ============================================================================
// Test Fixtures
// ============================================================================

const TRANSCRIPT: &str = "\
[12/05/2023, 14:03:21] Alice: hi
12/05/23 14:05 - Bob: yo
12/05/2023, 14:06:00 - Alice: IMG-1.jpg (file attached)
12/05/2023, 14:07:00 - Bob: VID-1.mp4 (file attached)
12/05/2023, 14:08:00 - Bob: Security code changed
31/02/2023, 10:00:00 - Alice: impossible date
13/05/2023, 09:00:00 - Alice: Bonjour !
";

fn write_zip(path: &std::path::Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Creates a temporary directory with a chat archive and a few side files.
fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");

    write_zip(
        &dir.path().join("chat.zip"),
        &[
            ("WhatsApp Chat with Bob.txt", TRANSCRIPT.as_bytes()),
            ("IMG-1.jpg", &[0xFF, 0xD8, 0xFF, 0xD9]),
            ("VID-1.mp4", &[0u8; 8]),
        ],
    );
    write_zip(
        &dir.path().join("media_only.zip"),
        &[("IMG-1.jpg", &[0xFF, 0xD8, 0xFF, 0xD9])],
    );

    fs::write(dir.path().join("not_a_zip.zip"), "plain text").unwrap();
    fs::write(
        dir.path().join("settings.json"),
        r##"{"title": "Depuis le fichier", "cover_color": "#EC4899", "font_family": "script"}"##,
    )
    .unwrap();
    fs::write(dir.path().join("preface.txt"), "Premier paragraphe\nSecond paragraphe").unwrap();
    fs::write(dir.path().join("cover.png"), [0x89, b'P', b'N', b'G']).unwrap();

    dir
}

fn chatbook_cmd() -> Command {
    let cmd = std::process::Command::new(env!("CARGO_BIN_EXE_chatbook"));
    Command::from_std(cmd)
}

fn path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

fn arg(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

mod basic_functionality {
    use super::*;

    #[test]
    fn test_convert_archive() {
        let fixtures = setup_fixtures();
        let output = path(&fixtures, "book.html");

        chatbook_cmd()
            .args([arg(&path(&fixtures, "chat.zip")), "-o", arg(&output)])
            .assert()
            .success()
            .stdout(predicate::str::contains("Done"))
            .stdout(predicate::str::contains("Messages:  5"))
            .stdout(predicate::str::contains("1 inlined, 0 unavailable"));

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Notre Histoire</title>"));
        assert!(html.contains("data:image/jpeg;base64,"));
        assert!(html.contains("QR Code vidéo"));
        assert!(!html.contains("Security code"));
    }

    #[test]
    fn test_invalid_date_is_reported() {
        let fixtures = setup_fixtures();
        let output = path(&fixtures, "book.html");

        chatbook_cmd()
            .args([arg(&path(&fixtures, "chat.zip")), "-o", arg(&output)])
            .assert()
            .success()
            .stdout(predicate::str::contains("line 6"))
            .stdout(predicate::str::contains("Warnings:  1"));
    }

    #[test]
    fn test_messages_json() {
        let fixtures = setup_fixtures();
        let output = path(&fixtures, "book.html");
        let json_path = path(&fixtures, "messages.json");

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "chat.zip")),
                "-o",
                arg(&output),
                "--messages-json",
                arg(&json_path),
            ])
            .assert()
            .success();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        let messages = json.as_array().unwrap();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0]["sender"], "Alice");
        assert_eq!(messages[2]["kind"], "image");
    }

    #[test]
    fn test_sequential_output_identical() {
        let fixtures = setup_fixtures();
        let first = path(&fixtures, "first.json");
        let second = path(&fixtures, "second.json");

        for (json, extra) in [(&first, None), (&second, Some("--sequential"))] {
            let mut cmd = chatbook_cmd();
            cmd.args([
                arg(&path(&fixtures, "chat.zip")),
                "-o",
                arg(&path(&fixtures, "book.html")),
                "--messages-json",
                arg(json),
            ]);
            if let Some(flag) = extra {
                cmd.arg(flag);
            }
            cmd.assert().success();
        }

        assert_eq!(
            fs::read_to_string(&first).unwrap(),
            fs::read_to_string(&second).unwrap()
        );
    }
}

// ============================================================================
// Settings Tests
// ============================================================================

mod settings {
    use super::*;

    #[test]
    fn test_flags() {
        let fixtures = setup_fixtures();
        let output = path(&fixtures, "book.html");

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "chat.zip")),
                "-o",
                arg(&output),
                "--title",
                "Vacances 2023",
                "--authors",
                "Alice & Bob",
                "--dedication",
                "Pour nous",
                "--text-size",
                "large",
                "--font",
                "sans-serif",
                "--no-web-fonts",
            ])
            .assert()
            .success();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<h1>Vacances 2023</h1>"));
        assert!(html.contains("par Alice &amp; Bob"));
        assert!(html.contains("<h2>Dédicace</h2>"));
        assert!(html.contains("--book-text-size: 18px;"));
        assert!(!html.contains("fonts.googleapis.com"));
    }

    #[test]
    fn test_settings_file_and_override() {
        let fixtures = setup_fixtures();
        let output = path(&fixtures, "book.html");

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "chat.zip")),
                "-o",
                arg(&output),
                "--settings",
                arg(&path(&fixtures, "settings.json")),
                "--cover-color",
                "#10B981",
            ])
            .assert()
            .success();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<h1>Depuis le fichier</h1>"));
        assert!(html.contains("--cover-color: #10B981;"));
        assert!(html.contains("Dancing Script"));
    }

    #[test]
    fn test_preface_and_cover_image() {
        let fixtures = setup_fixtures();
        let output = path(&fixtures, "book.html");

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "chat.zip")),
                "-o",
                arg(&output),
                "--preface-file",
                arg(&path(&fixtures, "preface.txt")),
                "--cover-image",
                arg(&path(&fixtures, "cover.png")),
            ])
            .assert()
            .success();

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<p>Premier paragraphe</p>"));
        assert!(html.contains("<p>Second paragraphe</p>"));
        assert!(html.contains("class=\"cover-image\" src=\"data:image/png;base64,"));
    }

    #[test]
    fn test_primary_first() {
        let fixtures = setup_fixtures();
        let output = path(&fixtures, "book.html");

        // Alice sends more messages, but Bob speaks first
        write_zip(
            &path(&fixtures, "bob_first.zip"),
            &[(
                "chat.txt",
                b"12/05/2023, 14:00:00 - Bob: first\n\
                  12/05/2023, 14:01:00 - Alice: a\n\
                  12/05/2023, 14:02:00 - Alice: b\n",
            )],
        );

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "bob_first.zip")),
                "-o",
                arg(&output),
                "--primary",
                "first",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Primary: first"));

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("<div class=\"sender\">Alice</div>"));
        assert!(!html.contains("<div class=\"sender\">Bob</div>"));
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

mod error_handling {
    use super::*;

    #[test]
    fn test_missing_archive() {
        let fixtures = setup_fixtures();

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "nope.zip")),
                "-o",
                arg(&path(&fixtures, "book.html")),
            ])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("❌ Error:"));
    }

    #[test]
    fn test_archive_without_transcript() {
        let fixtures = setup_fixtures();
        let output = path(&fixtures, "book.html");

        chatbook_cmd()
            .args([arg(&path(&fixtures, "media_only.zip")), "-o", arg(&output)])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no chat transcript"));

        assert!(!output.exists());
    }

    #[test]
    fn test_not_a_zip() {
        let fixtures = setup_fixtures();

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "not_a_zip.zip")),
                "-o",
                arg(&path(&fixtures, "book.html")),
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a valid zip archive"));
    }

    #[test]
    fn test_invalid_color() {
        let fixtures = setup_fixtures();

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "chat.zip")),
                "-o",
                arg(&path(&fixtures, "book.html")),
                "--bubble-user",
                "purple",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid setting 'bubble_color_user'"));
    }

    #[test]
    fn test_invalid_text_size_value() {
        chatbook_cmd()
            .args(["chat.zip", "--text-size", "huge"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value"));
    }

    #[test]
    fn test_missing_cover_image() {
        let fixtures = setup_fixtures();

        chatbook_cmd()
            .args([
                arg(&path(&fixtures, "chat.zip")),
                "-o",
                arg(&path(&fixtures, "book.html")),
                "--cover-image",
                arg(&path(&fixtures, "missing.png")),
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot read cover image"));
    }
}

// ============================================================================
// Help and Version
// ============================================================================

mod help_and_version {
    use super::*;

    #[test]
    fn test_help() {
        chatbook_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("ARCHIVE"))
            .stdout(predicate::str::contains("--messages-json"))
            .stdout(predicate::str::contains("EXAMPLES"));
    }

    #[test]
    fn test_version() {
        chatbook_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
