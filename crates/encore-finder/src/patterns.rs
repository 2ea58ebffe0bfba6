//! Fixed text conventions recognized ahead of name matching.

use std::sync::OnceLock;

use regex::Regex;

/// Entity kinds that carry a mention wrapper syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    /// `<@ID>` or `<@!ID>`.
    User,
    /// `<@&ID>`.
    Role,
    /// `<#ID>`.
    Channel,
}

impl MentionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Channel => "channel",
        }
    }

    fn pattern(self) -> &'static Regex {
        static USER: OnceLock<Regex> = OnceLock::new();
        static ROLE: OnceLock<Regex> = OnceLock::new();
        static CHANNEL: OnceLock<Regex> = OnceLock::new();
        let (cell, source) = match self {
            Self::User => (&USER, r"^<@!?(\d{17,20})>$"),
            Self::Role => (&ROLE, r"^<@&(\d{17,20})>$"),
            Self::Channel => (&CHANNEL, r"^<#(\d{17,20})>$"),
        };
        cell.get_or_init(|| compile(source))
    }
}

/// Outcome of matching a query against a mention wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionToken {
    /// The wrapper matched and its digits fit a snowflake.
    Id(u64),
    /// The wrapper matched but the digits overflow `u64`; nothing can resolve.
    Unresolvable,
}

/// Matches `raw` against the wrapper syntax of `kind`.
pub fn parse_mention(kind: MentionKind, raw: &str) -> Option<MentionToken> {
    let captures = kind.pattern().captures(raw)?;
    let digits = captures.get(1)?.as_str();
    Some(match digits.parse::<u64>() {
        Ok(id) => MentionToken::Id(id),
        Err(_) => MentionToken::Unresolvable,
    })
}

/// Returns true when `raw` is a bare 17-20 digit identifier.
pub fn is_snowflake(raw: &str) -> bool {
    static SNOWFLAKE: OnceLock<Regex> = OnceLock::new();
    SNOWFLAKE
        .get_or_init(|| compile(r"^\d{17,20}$"))
        .is_match(raw)
}

/// Parses a bare identifier; `None` for malformed or overflowing input.
pub fn parse_snowflake(raw: &str) -> Option<u64> {
    if !is_snowflake(raw) {
        return None;
    }
    raw.parse::<u64>().ok()
}

fn compile(source: &str) -> Regex {
    Regex::new(source).expect("static identifier pattern compiles")
}

#[cfg(test)]
mod tests {
    use super::{is_snowflake, parse_mention, parse_snowflake, MentionKind, MentionToken};

    #[test]
    fn unit_user_mention_accepts_nickname_bang() {
        assert_eq!(
            parse_mention(MentionKind::User, "<@!123456789012345678>"),
            Some(MentionToken::Id(123_456_789_012_345_678))
        );
        assert_eq!(
            parse_mention(MentionKind::User, "<@123456789012345678>"),
            Some(MentionToken::Id(123_456_789_012_345_678))
        );
    }

    #[test]
    fn unit_mention_wrappers_do_not_cross_kinds() {
        let role = "<@&123456789012345678>";
        let channel = "<#123456789012345678>";
        assert!(parse_mention(MentionKind::User, role).is_none());
        assert!(parse_mention(MentionKind::Channel, role).is_none());
        assert!(parse_mention(MentionKind::Role, channel).is_none());
        assert!(parse_mention(MentionKind::Role, role).is_some());
        assert!(parse_mention(MentionKind::Channel, channel).is_some());
    }

    #[test]
    fn unit_mention_rejects_short_or_padded_ids() {
        assert!(parse_mention(MentionKind::User, "<@1234>").is_none());
        assert!(parse_mention(MentionKind::User, " <@123456789012345678>").is_none());
        assert!(parse_mention(MentionKind::User, "<@123456789012345678> ").is_none());
    }

    #[test]
    fn regression_overflowing_mention_is_unresolvable_not_absent() {
        assert_eq!(
            parse_mention(MentionKind::Role, "<@&99999999999999999999>"),
            Some(MentionToken::Unresolvable)
        );
    }

    #[test]
    fn unit_snowflake_bounds_are_17_to_20_digits() {
        assert!(!is_snowflake("1234567890123456"));
        assert!(is_snowflake("12345678901234567"));
        assert!(is_snowflake("12345678901234567890"));
        assert!(!is_snowflake("123456789012345678901"));
        assert!(!is_snowflake("12345678901234567a"));
        assert_eq!(parse_snowflake("99999999999999999999"), None);
        assert_eq!(
            parse_snowflake("123456789012345678"),
            Some(123_456_789_012_345_678)
        );
    }
}
