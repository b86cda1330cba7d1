//! Zip archive extraction.
//!
//! A WhatsApp "export with media" is a zip holding one `.txt` transcript and
//! the attached files. [`extract_archive`] splits it into the transcript text
//! and a [`MediaLibrary`] keyed by base file name.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatbook::archive::read_archive;
//! use std::path::Path;
//!
//! let archive = read_archive(Path::new("WhatsApp Chat with Alice.zip"))?;
//! println!("{} media files", archive.media.len());
//! # Ok::<(), chatbook::ChatbookError>(())
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use tracing::{debug, info, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{ArchiveError, ChatbookError, Result};
use crate::media::{self, MediaCategory, TRANSCRIPT_EXTENSION};

/// Maximum size for a single archive entry (100 MB).
///
/// Larger media entries are skipped and a larger transcript is an error, so a
/// hostile archive cannot exhaust memory.
pub const MAX_ENTRY_SIZE: u64 = 100_000_000;

/// Raw bytes of one media file plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    /// File contents
    pub bytes: Vec<u8>,
    /// MIME type from the extension table
    pub mime_type: &'static str,
    /// Category from the extension table
    pub category: MediaCategory,
}

impl MediaPayload {
    /// Builds a payload, classifying it by file name.
    ///
    /// Returns `None` for extensions outside the media table.
    pub fn for_filename(filename: &str, bytes: Vec<u8>) -> Option<Self> {
        let (mime_type, category) = media::media_type_for_filename(filename)?;
        Some(Self {
            bytes,
            mime_type,
            category,
        })
    }

    /// Returns `true` for image payloads.
    pub fn is_image(&self) -> bool {
        self.category == MediaCategory::Image
    }
}

/// One named entry of a [`MediaLibrary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    /// Base file name (directory prefix stripped)
    pub filename: String,
    /// The file itself
    pub payload: MediaPayload,
}

/// Media payloads keyed by base file name, in archive order.
///
/// Inserting a name that already exists replaces the payload but keeps the
/// original position, so iteration order stays the order in which names were
/// first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaLibrary {
    entries: Vec<MediaEntry>,
    positions: HashMap<String, usize>,
}

impl MediaLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a payload.
    pub fn insert(&mut self, filename: impl Into<String>, payload: MediaPayload) {
        let filename = filename.into();
        if let Some(&pos) = self.positions.get(&filename) {
            self.entries[pos].payload = payload;
            return;
        }
        self.positions.insert(filename.clone(), self.entries.len());
        self.entries.push(MediaEntry { filename, payload });
    }

    /// Looks up a payload by exact file name.
    pub fn get(&self, filename: &str) -> Option<&MediaPayload> {
        self.positions
            .get(filename)
            .map(|&pos| &self.entries[pos].payload)
    }

    /// Iterates entries in archive order.
    pub fn iter(&self) -> impl Iterator<Item = &MediaEntry> {
        self.entries.iter()
    }

    /// Iterates image entries in archive order.
    pub fn images(&self) -> impl Iterator<Item = &MediaEntry> {
        self.entries.iter().filter(|entry| entry.payload.is_image())
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no media was stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts stored files of one category.
    pub fn count(&self, category: MediaCategory) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.payload.category == category)
            .count()
    }
}

/// Result of splitting an archive.
#[derive(Debug, Clone, Default)]
pub struct ExtractedArchive {
    /// Transcript text (BOM removed)
    pub transcript: String,
    /// Archive path of the transcript entry that was used
    pub transcript_name: String,
    /// Recognized media files
    pub media: MediaLibrary,
    /// Entries ignored because of unknown extensions, size or read errors
    pub skipped_entries: usize,
}

/// Strips any directory prefix from an archive path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn has_transcript_extension(name: &str) -> bool {
    media::extension_of(name).is_some_and(|ext| ext.eq_ignore_ascii_case(TRANSCRIPT_EXTENSION))
}

fn decode_transcript(name: &str, bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(entry = name, "transcript is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

enum EntryData {
    Bytes(Vec<u8>),
    TooLarge(u64),
}

fn read_entry<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    index: usize,
    max_size: u64,
) -> std::result::Result<EntryData, ZipError> {
    let mut entry = zip.by_index(index)?;
    if entry.size() > max_size {
        return Ok(EntryData::TooLarge(entry.size()));
    }
    let mut buf = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut buf)?;
    Ok(EntryData::Bytes(buf))
}

/// Splits archive bytes into transcript text and media payloads.
///
/// - Entries with a `.txt` extension are transcripts; if several exist the
///   last one in archive order wins.
/// - Entries whose extension is in the media table are stored under their
///   base name. A media entry that is oversized or cannot be read is
///   skipped with a warning.
/// - Everything else is ignored.
///
/// # Errors
///
/// [`ArchiveError::InvalidArchive`] when the bytes are not a readable zip or
/// the transcript entry is corrupt, [`ArchiveError::TranscriptTooLarge`] when
/// the transcript exceeds [`MAX_ENTRY_SIZE`], [`ArchiveError::NoTranscript`]
/// when no transcript entry exists.
pub fn extract_archive(bytes: &[u8]) -> Result<ExtractedArchive> {
    extract_archive_with_limit(bytes, MAX_ENTRY_SIZE)
}

/// Same as [`extract_archive`] with a custom per-entry size limit.
pub fn extract_archive_with_limit(bytes: &[u8], max_entry_size: u64) -> Result<ExtractedArchive> {
    let mut zip = ZipArchive::new(Cursor::new(bytes)).map_err(ArchiveError::from)?;
    info!(entries = zip.len(), "reading archive");

    let mut transcript: Option<(String, String)> = None;
    let mut media = MediaLibrary::new();
    let mut skipped_entries = 0;

    for index in 0..zip.len() {
        let Some(path) = zip.name_for_index(index).map(str::to_string) else {
            continue;
        };
        if path.ends_with('/') || path.ends_with('\\') {
            continue;
        }

        let is_transcript = has_transcript_extension(&path);
        let is_media = media::media_type_for_filename(&path).is_some();

        if !is_transcript && !is_media {
            debug!(entry = %path, "ignoring entry with unknown extension");
            skipped_entries += 1;
            continue;
        }

        let buf = match read_entry(&mut zip, index, max_entry_size) {
            Ok(EntryData::Bytes(buf)) => buf,
            Ok(EntryData::TooLarge(size)) if is_transcript => {
                return Err(ArchiveError::TranscriptTooLarge {
                    size,
                    max: max_entry_size,
                }
                .into());
            }
            Ok(EntryData::TooLarge(size)) => {
                warn!(entry = %path, size, "skipping oversized entry");
                skipped_entries += 1;
                continue;
            }
            Err(e) if is_transcript => return Err(ArchiveError::from(e).into()),
            Err(e) => {
                warn!(entry = %path, error = %e, "skipping unreadable media entry");
                skipped_entries += 1;
                continue;
            }
        };

        if is_transcript {
            if let Some((previous, _)) = &transcript {
                debug!(previous = %previous, entry = %path, "later transcript replaces earlier one");
            }
            let text = decode_transcript(&path, buf);
            transcript = Some((path, text));
        } else {
            let filename = base_name(&path).to_string();
            if let Some(payload) = MediaPayload::for_filename(&filename, buf) {
                debug!(file = %filename, mime = payload.mime_type, "stored media entry");
                media.insert(filename, payload);
            }
        }
    }

    let (transcript_name, transcript) = transcript.ok_or(ArchiveError::NoTranscript)?;
    info!(
        transcript = %transcript_name,
        media = media.len(),
        images = media.count(MediaCategory::Image),
        "archive extracted"
    );

    Ok(ExtractedArchive {
        transcript,
        transcript_name,
        media,
        skipped_entries,
    })
}

/// Reads an archive from disk and extracts it.
pub fn read_archive(path: &Path) -> Result<ExtractedArchive> {
    let bytes = fs::read(path).map_err(|e| ChatbookError::input_file("archive", path, e))?;
    extract_archive(&bytes)
}
