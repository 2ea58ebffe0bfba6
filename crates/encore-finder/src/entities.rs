use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, NO_TAG_SENTINEL, TAG_SEPARATOR};
use crate::finder::resolve;
use crate::patterns::MentionKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `Member` used across encore components.
pub struct Member {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl Member {
    pub fn new(id: u64, username: impl Into<String>, discriminator: Option<&str>) -> Self {
        Self {
            id,
            username: username.into(),
            discriminator: discriminator.map(str::to_string),
            nickname: None,
            bot: false,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Nickname when set, otherwise the username.
    pub fn effective_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }

    /// `username#discriminator`, or the bare username when untagged.
    pub fn tag_label(&self) -> String {
        match self.discriminator.as_deref() {
            Some(discriminator) if discriminator != NO_TAG_SENTINEL => {
                format!("{}{TAG_SEPARATOR}{discriminator}", self.username)
            }
            _ => self.username.clone(),
        }
    }
}

impl Candidate for Member {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.username
    }

    fn display_name(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    fn tag(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `Role` used across encore components.
pub struct Role {
    pub id: u64,
    pub name: String,
}

impl Role {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Candidate for Role {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `ChannelKind` values.
pub enum ChannelKind {
    #[default]
    Text,
    Voice,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `Channel` used across encore components.
pub struct Channel {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub kind: ChannelKind,
}

impl Channel {
    pub fn new(id: u64, name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

impl Candidate for Channel {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Snapshot of one guild's members, roles and channels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GuildRoster {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl GuildRoster {
    pub fn member(&self, id: u64) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn find_members(&self, query: &str) -> Vec<&Member> {
        resolve(query, &self.members, Some(MentionKind::User))
    }

    pub fn find_roles(&self, query: &str) -> Vec<&Role> {
        resolve(query, &self.roles, Some(MentionKind::Role))
    }

    pub fn find_text_channels(&self, query: &str) -> Vec<&Channel> {
        resolve(
            query,
            self.channels_of(ChannelKind::Text),
            Some(MentionKind::Channel),
        )
    }

    /// Voice channels have no mention syntax; ids and names only.
    pub fn find_voice_channels(&self, query: &str) -> Vec<&Channel> {
        resolve(query, self.channels_of(ChannelKind::Voice), None)
    }

    fn channels_of(&self, kind: ChannelKind) -> impl Iterator<Item = &Channel> {
        self.channels
            .iter()
            .filter(move |channel| channel.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::{Channel, ChannelKind, GuildRoster, Member, Role};

    fn roster() -> GuildRoster {
        GuildRoster {
            members: vec![
                Member::new(300_000_000_000_000_001, "carol", Some("1111")),
                Member::new(300_000_000_000_000_002, "caroline", Some("0000")).with_nickname("Lina"),
            ],
            roles: vec![Role::new(300_000_000_000_000_010, "DJ")],
            channels: vec![
                Channel::new(300_000_000_000_000_020, "music", ChannelKind::Text),
                Channel::new(300_000_000_000_000_021, "music", ChannelKind::Voice),
                Channel::new(300_000_000_000_000_022, "music-requests", ChannelKind::Text),
            ],
        }
    }

    #[test]
    fn unit_member_labels_respect_sentinel_discriminator() {
        let roster = roster();
        assert_eq!(roster.members[0].tag_label(), "carol#1111");
        assert_eq!(roster.members[1].tag_label(), "caroline");
        assert_eq!(roster.members[1].effective_name(), "Lina");
        assert_eq!(roster.members[0].effective_name(), "carol");
    }

    #[test]
    fn functional_channel_finders_filter_by_kind() {
        let roster = roster();
        let text = roster.find_text_channels("music");
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].id, 300_000_000_000_000_020);

        let voice = roster.find_voice_channels("music");
        assert_eq!(voice.len(), 1);
        assert_eq!(voice[0].kind, ChannelKind::Voice);
    }

    #[test]
    fn functional_voice_channels_ignore_mention_syntax_but_accept_ids() {
        let roster = roster();
        assert!(roster
            .find_voice_channels("<#300000000000000021>")
            .is_empty());
        assert_eq!(roster.find_voice_channels("300000000000000021").len(), 1);
        assert_eq!(roster.find_text_channels("<#300000000000000020>").len(), 1);
        assert!(roster
            .find_text_channels("<#300000000000000021>")
            .is_empty());
    }

    #[test]
    fn functional_member_finder_matches_nickname_prefix() {
        let roster = roster();
        let found = roster.find_members("lin");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "caroline");
        assert_eq!(roster.find_members("car").len(), 2);
    }

    #[test]
    fn unit_roster_deserializes_with_defaults() {
        let roster: GuildRoster = serde_json::from_str(
            r#"{
                "members": [{ "id": 300000000000000001, "username": "carol" }],
                "channels": [{ "id": 300000000000000020, "name": "general" }]
            }"#,
        )
        .expect("parse roster");
        assert!(roster.roles.is_empty());
        assert_eq!(roster.members[0].discriminator, None);
        assert!(!roster.members[0].bot);
        assert_eq!(roster.channels[0].kind, ChannelKind::Text);
        assert_eq!(
            roster.member(300_000_000_000_000_001).map(|m| m.username.as_str()),
            Some("carol")
        );
    }
}
