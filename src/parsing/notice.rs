//! System notices that WhatsApp writes into the transcript as if a member
//! had sent them.
//!
//! Exports prefix most of these bodies with an invisible left-to-right mark
//! (U+200E). Notices whose wording could appear in a real message ("created
//! group", "changed the subject", "left", ...) are only recognized when that
//! mark is present. Only the encryption banner, the security code notice and
//! deleted-message placeholders are matched on their exact wording alone.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Left-to-right mark WhatsApp puts in front of generated text.
pub const DIRECTION_MARK: char = '\u{200E}';

/// What kind of system notice a body is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Encryption,
    GroupCreated,
    Joined,
    Left,
    Added,
    Removed,
    SubjectChanged,
    DescriptionChanged,
    IconChanged,
    SecurityCodeChanged,
    MessageDeleted,
}

impl NoticeKind {
    /// Returns a short name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Encryption => "encryption",
            NoticeKind::GroupCreated => "group-created",
            NoticeKind::Joined => "joined",
            NoticeKind::Left => "left",
            NoticeKind::Added => "added",
            NoticeKind::Removed => "removed",
            NoticeKind::SubjectChanged => "subject-changed",
            NoticeKind::DescriptionChanged => "description-changed",
            NoticeKind::IconChanged => "icon-changed",
            NoticeKind::SecurityCodeChanged => "security-code-changed",
            NoticeKind::MessageDeleted => "message-deleted",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct NoticeRule {
    kind: NoticeKind,
    regex: Regex,
    requires_mark: bool,
}

/// (kind, pattern, requires the direction mark), in matching order.
const RULES: &[(NoticeKind, &str, bool)] = &[
    (
        NoticeKind::Encryption,
        r"^Messages and calls are end-to-end encrypted",
        false,
    ),
    (NoticeKind::GroupCreated, r"^(?:You|.+) created group\b", true),
    (
        NoticeKind::Joined,
        r"joined using this group's invite link\.?$",
        true,
    ),
    (
        NoticeKind::SubjectChanged,
        r"^(?:You|.+) changed the subject\b",
        true,
    ),
    (
        NoticeKind::DescriptionChanged,
        r"^(?:You|.+) changed the group description\b",
        true,
    ),
    (
        NoticeKind::IconChanged,
        r"^(?:You|.+) (?:changed|deleted) this group's icon\b",
        true,
    ),
    (
        NoticeKind::SecurityCodeChanged,
        r"(?i)^(?:your )?security code (?:with .+ )?changed\b",
        false,
    ),
    (
        NoticeKind::MessageDeleted,
        r"^(?:This message was deleted|You deleted this message)\.?$",
        false,
    ),
    (NoticeKind::Left, r"\bleft\b", true),
    (NoticeKind::Added, r"\badded\b", true),
    (NoticeKind::Removed, r"\bremoved\b", true),
];

static NOTICE_RULES: LazyLock<Vec<NoticeRule>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|&(kind, pattern, requires_mark)| NoticeRule {
            kind,
            regex: Regex::new(pattern).expect("notice pattern must compile"),
            requires_mark,
        })
        .collect()
});

/// Splits off a leading direction mark.
///
/// Returns the remaining text and whether a mark was present.
pub fn strip_direction_mark(body: &str) -> (&str, bool) {
    match body.strip_prefix(DIRECTION_MARK) {
        Some(rest) => (rest.trim_start(), true),
        None => (body, false),
    }
}

/// Classifies a message body as a system notice, if it is one.
pub fn system_notice(body: &str) -> Option<NoticeKind> {
    let (text, marked) = strip_direction_mark(body.trim());
    NOTICE_RULES
        .iter()
        .filter(|rule| marked || !rule.requires_mark)
        .find(|rule| rule.regex.is_match(text))
        .map(|rule| rule.kind)
}

/// Returns `true` if the body is a system notice.
pub fn is_system_notice(body: &str) -> bool {
    system_notice(body).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_code_changed() {
        assert_eq!(
            system_notice("Security code changed"),
            Some(NoticeKind::SecurityCodeChanged)
        );
        assert_eq!(
            system_notice("\u{200E}Your security code with Bob changed. Tap to learn more."),
            Some(NoticeKind::SecurityCodeChanged)
        );
    }

    #[test]
    fn test_strict_notices_without_mark() {
        assert_eq!(
            system_notice(
                "Messages and calls are end-to-end encrypted. No one outside of this chat can read them."
            ),
            Some(NoticeKind::Encryption)
        );
        assert_eq!(
            system_notice("This message was deleted"),
            Some(NoticeKind::MessageDeleted)
        );
    }

    #[test]
    fn test_group_notices_with_mark() {
        assert_eq!(
            system_notice("\u{200E}You created group \"Famille\""),
            Some(NoticeKind::GroupCreated)
        );
        assert_eq!(
            system_notice("\u{200E}Alice joined using this group's invite link"),
            Some(NoticeKind::Joined)
        );
        assert_eq!(
            system_notice("\u{200E}Bob changed the subject to \"Trip\""),
            Some(NoticeKind::SubjectChanged)
        );
        assert_eq!(
            system_notice("\u{200E}Bob changed this group's icon"),
            Some(NoticeKind::IconChanged)
        );
        assert_eq!(
            system_notice("\u{200E}Bob changed the group description"),
            Some(NoticeKind::DescriptionChanged)
        );
    }

    #[test]
    fn test_broad_notices_need_mark() {
        assert_eq!(system_notice("\u{200E}Bob left"), Some(NoticeKind::Left));
        assert_eq!(
            system_notice("\u{200E}Alice added Bob"),
            Some(NoticeKind::Added)
        );
        assert_eq!(
            system_notice("\u{200E}Carol was removed"),
            Some(NoticeKind::Removed)
        );

        assert_eq!(system_notice("I left my keys at home"), None);
        assert_eq!(system_notice("I added sugar"), None);
    }

    #[test]
    fn test_group_wording_in_ordinary_sentences() {
        assert_eq!(system_notice("haha you changed the subject again"), None);
        assert_eq!(system_notice("Maman changed this group's icon, c'est joli"), None);
        assert_eq!(system_notice("I think Bob created group chaos yesterday"), None);
        assert_eq!(system_notice("Bob changed the group description to a poem"), None);
        assert_eq!(
            system_notice("lol Carol joined using this group's invite link"),
            None
        );
    }

    #[test]
    fn test_ordinary_messages() {
        assert!(!is_system_notice("hi"));
        assert!(!is_system_notice("the security code is on the fridge"));
        assert!(!is_system_notice("this message was deleted by mistake?"));
    }

    #[test]
    fn test_strip_direction_mark() {
        assert_eq!(strip_direction_mark("\u{200E}hello"), ("hello", true));
        assert_eq!(strip_direction_mark("hello"), ("hello", false));
    }
}
