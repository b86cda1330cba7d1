//! Choosing the primary speaker of a conversation.
//!
//! The primary speaker's bubbles are right-aligned and drawn in the "user"
//! color; everyone else is left-aligned with their name shown.

use crate::message::Message;

/// Picks the sender whose messages are laid out as "mine".
///
/// Any `Fn(&[Message]) -> Option<String>` closure is a policy too.
///
/// # Example
///
/// ```rust
/// use chatbook::render::{BookRenderer, SpeakerPolicy};
/// use chatbook::Message;
///
/// // Always put "Alice" on the right.
/// let renderer = BookRenderer::new()
///     .with_speaker_policy(|_: &[Message]| Some("Alice".to_string()));
/// ```
pub trait SpeakerPolicy: Send + Sync {
    /// Returns the primary speaker, or `None` for an empty conversation.
    fn primary_speaker(&self, messages: &[Message]) -> Option<String>;
}

/// Sender with the most messages; ties go to whoever spoke first.
#[derive(Debug, Clone, Copy, Default)]
pub struct MostFrequentSender;

/// Whoever sent the first message. Suits one-to-one chats exported by the
/// owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSender;

/// Message count per sender, in first-seen order.
pub fn sender_counts(messages: &[Message]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for message in messages {
        match counts.iter_mut().find(|(sender, _)| *sender == message.sender) {
            Some((_, count)) => *count += 1,
            None => counts.push((&message.sender, 1)),
        }
    }
    counts
}

impl SpeakerPolicy for MostFrequentSender {
    fn primary_speaker(&self, messages: &[Message]) -> Option<String> {
        let mut best: Option<(&str, usize)> = None;
        for (sender, count) in sender_counts(messages) {
            // strictly greater: earlier senders win ties
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((sender, count));
            }
        }
        best.map(|(sender, _)| sender.to_string())
    }
}

impl SpeakerPolicy for FirstSender {
    fn primary_speaker(&self, messages: &[Message]) -> Option<String> {
        messages.first().map(|m| m.sender.clone())
    }
}

impl<F> SpeakerPolicy for F
where
    F: Fn(&[Message]) -> Option<String> + Send + Sync,
{
    fn primary_speaker(&self, messages: &[Message]) -> Option<String> {
        self(messages)
    }
}
