//! Aggregate counts shown on the cover.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::message::{Message, MessageKind};

use super::speaker::sender_counts;

/// Totals over a message list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookStats {
    /// Number of messages
    pub messages: usize,
    /// Image messages (resolved or not)
    pub photos: usize,
    /// Video messages
    pub videos: usize,
    /// Audio messages
    pub audios: usize,
    /// Image messages with an inlined payload
    pub inlined_photos: usize,
    /// Distinct senders
    pub senders: usize,
    /// Timestamp of the first message
    pub first: Option<DateTime<Utc>>,
    /// Timestamp of the last message
    pub last: Option<DateTime<Utc>>,
}

impl BookStats {
    /// Counts everything in one pass over `messages`.
    pub fn collect(messages: &[Message]) -> Self {
        let mut stats = Self {
            messages: messages.len(),
            senders: sender_counts(messages).len(),
            first: messages.first().map(|m| m.timestamp),
            last: messages.last().map(|m| m.timestamp),
            ..Self::default()
        };

        for message in messages {
            match message.kind {
                MessageKind::Image => {
                    stats.photos += 1;
                    if message.has_image() {
                        stats.inlined_photos += 1;
                    }
                }
                MessageKind::Video => stats.videos += 1,
                MessageKind::Audio => stats.audios += 1,
                MessageKind::Text => {}
            }
        }

        stats
    }

    /// Photos that render as "unavailable".
    pub fn missing_photos(&self) -> usize {
        self.photos - self.inlined_photos
    }
}
