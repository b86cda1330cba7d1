//! Unified error types for chatbook.
//!
//! Only [`ArchiveError`] aborts a conversion. Everything else that can go wrong
//! while turning an export into a book degrades locally:
//!
//! - transcript lines that match no grammar are dropped silently,
//! - lines with impossible dates become [`ParseWarning`](crate::parser::ParseWarning)s,
//! - media that cannot be inlined become [`MediaError`]s, logged and rendered
//!   as "unavailable" placeholders.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatbook operations.
///
/// # Example
///
/// ```rust
/// use chatbook::error::Result;
/// use chatbook::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatbookError>;

/// The error type for all fallible chatbook operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatbookError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The input archive doesn't exist
    /// - Permission denied
    /// - Disk is full (when writing the book)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input archive could not be used.
    ///
    /// Fatal: the pipeline stops and the reason is reported to the caller.
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// JSON parsing/serialization error (settings files, message dumps).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A book setting has a value the renderer cannot use.
    #[error("Invalid setting '{field}': {message}")]
    InvalidSettings {
        /// Name of the offending field
        field: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// The locale name is not known to the date formatter.
    #[error("Unknown locale '{input}'. Expected a POSIX locale name such as fr_FR or en_US")]
    InvalidLocale {
        /// The locale string that was provided
        input: String,
    },

    /// A custom transcript line grammar is unusable.
    #[error("Invalid line grammar '{name}': {message}")]
    InvalidGrammar {
        /// Grammar name
        name: String,
        /// Description of what's wrong
        message: String,
    },

    /// A file referenced from the command line or settings could not be read.
    #[error("Cannot read {what} ({}): {source}", path.display())]
    InputFile {
        /// What the file was supposed to be (e.g. "cover image")
        what: &'static str,
        /// The path that failed
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: io::Error,
    },
}

/// Fatal archive-level failures.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive holds no entry with a transcript extension.
    #[error("no chat transcript (.txt) found in the archive")]
    NoTranscript,

    /// The transcript entry exceeds the per-entry size limit.
    #[error("chat transcript is too large: {size} bytes (maximum: {max} bytes)")]
    TranscriptTooLarge {
        /// Uncompressed size declared by the archive
        size: u64,
        /// Limit in effect
        max: u64,
    },

    /// The bytes are not a readable zip archive.
    #[error("not a valid zip archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),
}

/// Per-item media failures.
///
/// These never leave the resolver: the affected message simply ends up
/// without an inlined payload or placeholder code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The archive entry was empty.
    #[error("'{filename}' is empty")]
    EmptyPayload {
        /// Archive file name
        filename: String,
    },

    /// The payload exceeds the inline size limit.
    #[error("'{filename}' is too large to inline: {size} bytes (maximum: {max} bytes)")]
    TooLarge {
        /// Archive file name
        filename: String,
        /// Actual size in bytes
        size: usize,
        /// Configured limit in bytes
        max: usize,
    },

    /// The payload's MIME type is not an image type.
    #[error("'{filename}' is not an image ({mime})")]
    NotAnImage {
        /// Archive file name
        filename: String,
        /// MIME type recorded by the extractor
        mime: String,
    },

    /// The scannable code could not be generated.
    #[error("cannot generate placeholder code: {0}")]
    PlaceholderCode(String),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatbookError {
    /// Creates an invalid settings error.
    pub fn invalid_settings(field: &'static str, message: impl Into<String>) -> Self {
        ChatbookError::InvalidSettings {
            field,
            message: message.into(),
        }
    }

    /// Creates an invalid locale error.
    pub fn invalid_locale(input: impl Into<String>) -> Self {
        ChatbookError::InvalidLocale {
            input: input.into(),
        }
    }

    /// Creates an invalid grammar error.
    pub fn invalid_grammar(name: impl Into<String>, message: impl Into<String>) -> Self {
        ChatbookError::InvalidGrammar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an input file error.
    pub fn input_file(what: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ChatbookError::InputFile {
            what,
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatbookError::Io(_) | ChatbookError::InputFile { .. })
    }

    /// Returns `true` if this is an archive error.
    pub fn is_archive(&self) -> bool {
        matches!(self, ChatbookError::Archive(_))
    }

    /// Returns `true` if the archive contained no transcript.
    pub fn is_no_transcript(&self) -> bool {
        matches!(self, ChatbookError::Archive(ArchiveError::NoTranscript))
    }

    /// Returns `true` if this is a settings-related error.
    pub fn is_invalid_settings(&self) -> bool {
        matches!(
            self,
            ChatbookError::InvalidSettings { .. } | ChatbookError::InvalidLocale { .. }
        )
    }
}
