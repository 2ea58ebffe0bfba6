use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use encore_finder::{Channel, ChannelKind, GuildRoster, Member, Role};
use encore_waiter::{EventWaiter, WaiterConfig};

use crate::config::BotConfig;
use crate::context::{BotContext, Replier};
use crate::queue::QueueEntry;

pub(crate) const DJ: u64 = 100_000_000_000_000_001;
pub(crate) const ALICE_42: u64 = 100_000_000_000_000_042;
pub(crate) const ALICE_43: u64 = 100_000_000_000_000_043;
pub(crate) const BOB: u64 = 100_000_000_000_000_077;
pub(crate) const CAROL: u64 = 100_000_000_000_000_099;
pub(crate) const SPINBOT: u64 = 100_000_000_000_000_500;
pub(crate) const CHANNEL: u64 = 300_000_000_000_000_001;

#[derive(Debug, Default)]
pub(crate) struct RecordingReplier {
    sent: Mutex<Vec<(u64, String)>>,
}

impl RecordingReplier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("replier lock")
            .iter()
            .map(|(_, content)| content.clone())
            .collect()
    }
}

#[async_trait]
impl Replier for RecordingReplier {
    async fn reply(&self, channel_id: u64, content: String) -> Result<()> {
        self.sent
            .lock()
            .expect("replier lock")
            .push((channel_id, content));
        Ok(())
    }
}

pub(crate) fn fixture_config(selection_timeout_ms: u64) -> BotConfig {
    BotConfig {
        selection_timeout_ms,
        console_author_id: DJ,
        console_channel_id: CHANNEL,
        roster: GuildRoster {
            members: vec![
                Member::new(DJ, "dj-host", Some("0001")),
                Member::new(ALICE_42, "alice", Some("0042")),
                Member::new(ALICE_43, "alice", Some("0043")).with_nickname("Ally"),
                Member::new(BOB, "bob", Some("0007")),
                Member::new(CAROL, "carol", None),
                Member {
                    bot: true,
                    ..Member::new(SPINBOT, "spinbot", None)
                },
            ],
            roles: vec![
                Role::new(200_000_000_000_000_001, "DJ"),
                Role::new(200_000_000_000_000_002, "Moderator"),
                Role::new(200_000_000_000_000_003, "Mods"),
            ],
            channels: vec![
                Channel::new(300_000_000_000_000_001, "music", ChannelKind::Text),
                Channel::new(300_000_000_000_000_002, "music", ChannelKind::Voice),
            ],
        },
        catalog: vec![
            "Blue Monday".to_string(),
            "Blue Velvet".to_string(),
            "Paranoid Android".to_string(),
        ],
        queue: vec![
            QueueEntry::new("Karma Police", ALICE_42),
            QueueEntry::new("Lucky", BOB),
            QueueEntry::new("No Surprises", ALICE_42),
        ],
        ..BotConfig::default()
    }
}

pub(crate) fn fixture_context(selection_timeout_ms: u64) -> (BotContext, Arc<RecordingReplier>) {
    let replier = Arc::new(RecordingReplier::default());
    let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
    let context = BotContext::new(
        fixture_config(selection_timeout_ms),
        waiter,
        Arc::clone(&replier) as Arc<dyn Replier>,
    );
    (context, replier)
}

pub(crate) async fn wait_until_pending(waiter: &EventWaiter, expected: usize) {
    for _ in 0..400 {
        if waiter.pending_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("waiter never reached {expected} pending waits");
}
