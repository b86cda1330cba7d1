//! Date normalization for transcript timestamps.
//!
//! Exports write dates as `d/m/yy`, `dd/mm/yyyy` and times with or without
//! seconds. Everything is rewritten to `YYYY-MM-DDTHH:MM:SS` before chrono
//! parses it, so every grammar shares one code path.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Why a date/time pair could not be turned into a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// The date does not have exactly three `/`-separated parts.
    #[error("malformed date '{0}'")]
    MalformedDate(String),

    /// The time does not have two or three `:`-separated parts.
    #[error("malformed time '{0}'")]
    MalformedTime(String),

    /// The components are well-formed but name no real instant (e.g. 31/02).
    #[error("no such date or time: {0}")]
    OutOfRange(String),
}

fn pad2(part: &str) -> String {
    format!("{part:0>2}")
}

/// Builds the canonical `YYYY-MM-DDTHH:MM:SS` form of a date/time pair.
///
/// Day and month come first in the date. Two-digit years get a `20` prefix.
pub fn canonical_timestamp(date: &str, time: &str) -> Result<String, TimestampError> {
    let date_parts: Vec<&str> = date.split('/').collect();
    let [day, month, year] = date_parts.as_slice() else {
        return Err(TimestampError::MalformedDate(date.to_string()));
    };
    if [day, month, year].iter().any(|p| p.is_empty()) {
        return Err(TimestampError::MalformedDate(date.to_string()));
    }

    let year = if year.len() == 2 {
        format!("20{year}")
    } else {
        (*year).to_string()
    };

    let time_parts: Vec<&str> = time.split(':').collect();
    let (hour, minute, second) = match time_parts.as_slice() {
        [h, m] => (*h, *m, "00"),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(TimestampError::MalformedTime(time.to_string())),
    };

    Ok(format!(
        "{year}-{}-{}T{}:{}:{}",
        pad2(month),
        pad2(day),
        pad2(hour),
        pad2(minute),
        pad2(second)
    ))
}

/// Normalizes a date/time pair into a UTC timestamp.
///
/// Transcripts carry no zone information; the wall-clock time is taken as UTC
/// so ordering and day boundaries are stable regardless of the host zone.
pub fn normalize_timestamp(date: &str, time: &str) -> Result<DateTime<Utc>, TimestampError> {
    let canonical = canonical_timestamp(date, time)?;
    NaiveDateTime::parse_from_str(&canonical, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| TimestampError::OutOfRange(canonical))
}
