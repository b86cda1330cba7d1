//! Building blocks of the transcript parser.
//!
//! Each piece is a table or a pure function so it can be tested on its own:
//!
//! - [`grammar`]: ordered line grammars (date, time, sender, body)
//! - [`timestamp`]: date normalization
//! - [`notice`]: system notices to skip
//! - [`classify`]: text vs. media classification of a body

pub mod classify;
pub mod grammar;
pub mod notice;
pub mod timestamp;

pub use classify::{Classification, classify_body};
pub use grammar::{GrammarTable, LineFormat, LineGrammar, LineParts};
pub use notice::{NoticeKind, is_system_notice, system_notice};
pub use timestamp::{TimestampError, normalize_timestamp};
