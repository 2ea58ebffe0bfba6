use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use encore_bot::{run_console, BotConfig, BotContext, QueueEntry, Replier};
use encore_finder::{GuildRoster, Member, Role};
use encore_menu::{
    choose_one, Choice, MessageReceived, Resolution, SelectionMenu, SelectionRequest,
};
use encore_waiter::{EventWaiter, WaiterConfig};
use tokio::io::BufReader;

const HOST: u64 = 500_000_000_000_000_001;
const GUEST: u64 = 500_000_000_000_000_002;
const CHANNEL: u64 = 600_000_000_000_000_001;

#[derive(Default)]
struct TranscriptReplier {
    lines: Mutex<Vec<String>>,
}

impl TranscriptReplier {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("transcript lock").clone()
    }
}

#[async_trait]
impl Replier for TranscriptReplier {
    async fn reply(&self, _channel_id: u64, content: String) -> anyhow::Result<()> {
        self.lines.lock().expect("transcript lock").push(content);
        Ok(())
    }
}

fn roster() -> GuildRoster {
    GuildRoster {
        members: vec![
            Member::new(HOST, "host", Some("0001")),
            Member::new(700_000_000_000_000_001, "sam", Some("1111")),
            Member::new(700_000_000_000_000_002, "sam", Some("2222")),
            Member::new(700_000_000_000_000_003, "samantha", Some("3333")),
        ],
        roles: vec![Role::new(800_000_000_000_000_001, "Listeners")],
        channels: Vec::new(),
    }
}

async fn wait_until_pending(waiter: &EventWaiter, expected: usize) {
    for _ in 0..400 {
        if waiter.pending_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("waiter never reached {expected} pending waits");
}

#[tokio::test]
async fn integration_finder_menu_and_waiter_compose_into_a_selection() {
    let roster = roster();
    let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");

    let matches: Vec<Member> = roster
        .find_members("sam")
        .into_iter()
        .cloned()
        .collect();
    let candidates = match Resolution::from_matches(matches) {
        Resolution::Ambiguous(candidates) => candidates,
        other => panic!("expected ambiguity, got {other:?}"),
    };
    assert_eq!(candidates.len(), 2, "exact tier hides the samantha prefix match");

    let menu = SelectionMenu::new("Found multiple users:", 4)
        .with_options(candidates.iter().map(Member::tag_label));
    assert!(menu.render().contains("`2` sam#2222"));

    let selection = tokio::spawn({
        let waiter = waiter.clone();
        let request = SelectionRequest::new(HOST, CHANNEL, Duration::from_secs(2));
        async move { choose_one(&waiter, request, candidates).await }
    });
    wait_until_pending(&waiter, 1).await;

    assert_eq!(waiter.dispatch(&MessageReceived::new(1, GUEST, CHANNEL, "1")), 0);
    assert_eq!(
        waiter.dispatch(&MessageReceived::new(2, HOST, CHANNEL, "2").from_bot()),
        0
    );
    assert_eq!(waiter.dispatch(&MessageReceived::new(3, HOST, CHANNEL, "2")), 1);

    match selection.await.expect("join").expect("selection") {
        Choice::Picked(member) => assert_eq!(member.tag_label(), "sam#2222"),
        other => panic!("expected a pick, got {other:?}"),
    }
    let stats = waiter.stats();
    assert_eq!(stats.fulfilled, 1);
    assert_eq!(stats.expired, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn integration_console_session_resolves_ambiguous_forceremove() {
    let config = BotConfig {
        console_author_id: HOST,
        console_channel_id: CHANNEL,
        selection_timeout_ms: 5_000,
        roster: roster(),
        queue: vec![
            QueueEntry::new("Track One", 700_000_000_000_000_002),
            QueueEntry::new("Track Two", HOST),
            QueueEntry::new("Track Three", 700_000_000_000_000_002),
        ],
        ..BotConfig::default()
    };
    let replier = Arc::new(TranscriptReplier::default());
    let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
    let ctx = BotContext::new(config, waiter, Arc::clone(&replier) as Arc<dyn Replier>);

    let script: &[u8] = b"!forceremove sam\n[500000000000000002] 1\n2\nquit\n";
    let session = tokio::spawn(run_console(ctx.clone(), BufReader::new(script)));

    session.await.expect("join").expect("console session");
    let transcript = replier.lines();
    assert_eq!(transcript.len(), 2, "transcript: {transcript:?}");
    assert!(transcript[0].starts_with("Found multiple users:\n`1` **sam**#1111\n`2` **sam**#2222"));
    assert_eq!(
        transcript[1],
        "Successfully removed `2` entries from **sam**#2222."
    );
    assert_eq!(ctx.queue().len(), 1);
    assert!(ctx.waiter().is_shut_down());
}
