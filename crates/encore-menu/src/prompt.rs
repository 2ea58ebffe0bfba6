use std::time::Duration;

use encore_waiter::{EventWaiter, Subscription, WaitOutcome, WaiterError};
use thiserror::Error;
use tracing::{debug, info};

use crate::events::MessageReceived;
use crate::selection::{parse_selection, Selection};

/// Who may answer a menu, where, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest {
    pub author_id: u64,
    pub channel_id: u64,
    pub timeout: Duration,
}

impl SelectionRequest {
    pub fn new(author_id: u64, channel_id: u64, timeout: Duration) -> Self {
        Self {
            author_id,
            channel_id,
            timeout,
        }
    }

    /// Whether `message` is a usable answer to a menu of `option_count` entries.
    pub fn accepts(&self, message: &MessageReceived, option_count: usize) -> bool {
        !message.author_is_bot
            && message.author_id == self.author_id
            && message.channel_id == self.channel_id
            && parse_selection(&message.content, option_count).is_recognized()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    Picked(T),
    Cancelled,
    TimedOut,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("selection menu has no options")]
    NoOptions,
    #[error(transparent)]
    Waiter(#[from] WaiterError),
}

/// A menu whose reply wait is already registered with the waiter.
///
/// Build it before showing the menu so a reply that arrives right after the
/// menu is rendered cannot slip past. Dropping it cancels the wait.
pub struct PendingChoice<T> {
    subscription: Subscription<MessageReceived>,
    options: Vec<T>,
    author_id: u64,
}

/// Registers the reply wait for a menu over `options`.
///
/// Replies from other authors, other channels, bots, or replies that are
/// neither a valid number nor `cancel` are ignored and the wait stays open.
pub fn begin_choice<T>(
    waiter: &EventWaiter,
    request: SelectionRequest,
    options: Vec<T>,
) -> Result<PendingChoice<T>, MenuError> {
    let option_count = options.len();
    if option_count == 0 {
        return Err(MenuError::NoOptions);
    }

    let subscription = waiter.subscribe(
        move |message: &MessageReceived| request.accepts(message, option_count),
        Some(request.timeout),
    )?;
    debug!(
        author_id = request.author_id,
        channel_id = request.channel_id,
        option_count,
        "awaiting menu selection"
    );
    Ok(PendingChoice {
        subscription,
        options,
        author_id: request.author_id,
    })
}

impl<T> PendingChoice<T> {
    pub async fn resolve(self) -> Result<Choice<T>, MenuError> {
        let Self {
            subscription,
            options,
            author_id,
        } = self;
        let reply = match subscription.outcome().await? {
            WaitOutcome::Matched(reply) => reply,
            WaitOutcome::TimedOut => {
                info!(author_id, "menu selection timed out");
                return Ok(Choice::TimedOut);
            }
        };
        match parse_selection(&reply.content, options.len()) {
            Selection::Chosen(index) => Ok(options
                .into_iter()
                .nth(index)
                .map_or(Choice::Cancelled, Choice::Picked)),
            Selection::Cancelled | Selection::Unrecognized => Ok(Choice::Cancelled),
        }
    }
}

/// Waits for the requesting author to pick one of `options` by number.
pub async fn choose_one<T>(
    waiter: &EventWaiter,
    request: SelectionRequest,
    options: Vec<T>,
) -> Result<Choice<T>, MenuError> {
    begin_choice(waiter, request, options)?.resolve().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use encore_waiter::{EventWaiter, WaiterConfig, WaiterError};

    use super::{begin_choice, choose_one, Choice, MenuError, SelectionRequest};
    use crate::events::MessageReceived;

    const AUTHOR: u64 = 111_111_111_111_111_111;
    const CHANNEL: u64 = 222_222_222_222_222_222;

    fn request(timeout_ms: u64) -> SelectionRequest {
        SelectionRequest::new(AUTHOR, CHANNEL, Duration::from_millis(timeout_ms))
    }

    async fn wait_until_pending(waiter: &EventWaiter, expected: usize) {
        for _ in 0..200 {
            if waiter.pending_count() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("waiter never reached {expected} pending waits");
    }

    #[test]
    fn unit_request_rejects_bots_other_authors_and_channels() {
        let request = request(1_000);
        let reply = MessageReceived::new(1, AUTHOR, CHANNEL, "2");
        assert!(request.accepts(&reply, 3));
        assert!(!request.accepts(&reply.clone().from_bot(), 3));
        assert!(!request.accepts(&MessageReceived::new(1, AUTHOR + 1, CHANNEL, "2"), 3));
        assert!(!request.accepts(&MessageReceived::new(1, AUTHOR, CHANNEL + 1, "2"), 3));
        assert!(!request.accepts(&MessageReceived::new(1, AUTHOR, CHANNEL, "9"), 3));
        assert!(request.accepts(&MessageReceived::new(1, AUTHOR, CHANNEL, "cancel"), 3));
    }

    #[tokio::test]
    async fn functional_choose_one_returns_selected_option() {
        let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
        let menu = tokio::spawn({
            let waiter = waiter.clone();
            async move { choose_one(&waiter, request(2_000), vec!["a", "b", "c"]).await }
        });
        wait_until_pending(&waiter, 1).await;

        assert_eq!(
            waiter.dispatch(&MessageReceived::new(1, AUTHOR, CHANNEL, "2")),
            1
        );
        let choice = menu.await.expect("join").expect("menu");
        assert_eq!(choice, Choice::Picked("b"));
        assert_eq!(waiter.pending_count(), 0);
    }

    #[tokio::test]
    async fn functional_unrecognized_reply_keeps_menu_open() {
        let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
        let menu = tokio::spawn({
            let waiter = waiter.clone();
            async move { choose_one(&waiter, request(2_000), vec![10_u32, 20]).await }
        });
        wait_until_pending(&waiter, 1).await;

        assert_eq!(
            waiter.dispatch(&MessageReceived::new(1, AUTHOR, CHANNEL, "hello")),
            0
        );
        assert_eq!(
            waiter.dispatch(&MessageReceived::new(2, AUTHOR + 1, CHANNEL, "1")),
            0
        );
        assert_eq!(waiter.pending_count(), 1);
        waiter.dispatch(&MessageReceived::new(3, AUTHOR, CHANNEL, "1"));

        let choice = menu.await.expect("join").expect("menu");
        assert_eq!(choice, Choice::Picked(10));
    }

    #[tokio::test]
    async fn functional_cancel_reply_cancels_menu() {
        let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
        let menu = tokio::spawn({
            let waiter = waiter.clone();
            async move { choose_one(&waiter, request(2_000), vec!["only"]).await }
        });
        wait_until_pending(&waiter, 1).await;
        waiter.dispatch(&MessageReceived::new(1, AUTHOR, CHANNEL, "Cancel"));

        assert_eq!(menu.await.expect("join").expect("menu"), Choice::Cancelled);
    }

    #[tokio::test]
    async fn functional_menu_times_out_without_reply() {
        let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
        let choice = choose_one(&waiter, request(50), vec!["a", "b"])
            .await
            .expect("menu");
        assert_eq!(choice, Choice::TimedOut);
        assert_eq!(waiter.pending_count(), 0);
    }

    #[tokio::test]
    async fn unit_empty_option_list_is_rejected() {
        let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
        let error = choose_one::<u8>(&waiter, request(50), Vec::new())
            .await
            .expect_err("empty menu");
        assert_eq!(error, MenuError::NoOptions);
    }

    #[tokio::test]
    async fn regression_shutdown_while_menu_open_reports_cancelled_wait() {
        let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
        let menu = tokio::spawn({
            let waiter = waiter.clone();
            async move { choose_one(&waiter, request(5_000), vec!["a"]).await }
        });
        wait_until_pending(&waiter, 1).await;
        waiter.shutdown();

        let error = menu.await.expect("join").expect_err("shutdown");
        assert_eq!(error, MenuError::Waiter(WaiterError::Cancelled));
    }

    #[tokio::test]
    async fn regression_reply_dispatched_right_after_menu_is_not_lost() {
        let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
        let pending = begin_choice(&waiter, request(2_000), vec!["a", "b"]).expect("menu");

        assert_eq!(
            waiter.dispatch(&MessageReceived::new(1, AUTHOR, CHANNEL, "2")),
            1
        );
        assert_eq!(pending.resolve().await.expect("menu"), Choice::Picked("b"));
    }

    #[tokio::test]
    async fn unit_begin_choice_after_shutdown_is_rejected() {
        let waiter = EventWaiter::new(WaiterConfig::default()).expect("waiter");
        waiter.shutdown();
        let error = begin_choice(&waiter, request(2_000), vec!["a"])
            .err()
            .expect("shut down");
        assert_eq!(error, MenuError::Waiter(WaiterError::ShutDown));
    }
}
