use anyhow::{Context, Result};
use async_trait::async_trait;
use encore_finder::parse_snowflake;
use encore_menu::MessageReceived;
use encore_waiter::GatewayShutdown;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::commands::{run_command, Checkpoint, Command};
use crate::config::BotConfig;
use crate::context::{BotContext, Replier};

const QUIT_COMMAND: &str = "quit";

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Message(MessageReceived),
    Quit,
    Blank,
}

/// Parses `[AUTHOR_ID] text`; without a leading snowflake the configured
/// console author speaks.
pub fn parse_console_line(line: &str, message_id: u64, config: &BotConfig) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Blank;
    }

    let (author_id, text) = match line.split_once(char::is_whitespace) {
        Some((token, rest)) => match parse_author_token(token) {
            Some(author_id) => (author_id, rest.trim()),
            None => (config.console_author_id, line),
        },
        None => (config.console_author_id, line),
    };
    if text.eq_ignore_ascii_case(QUIT_COMMAND) {
        return ConsoleInput::Quit;
    }
    if text.is_empty() {
        return ConsoleInput::Blank;
    }
    let message = MessageReceived::new(message_id, author_id, config.console_channel_id, text);
    let from_bot = config
        .roster
        .member(author_id)
        .is_some_and(|member| member.bot);
    ConsoleInput::Message(if from_bot { message.from_bot() } else { message })
}

fn parse_author_token(token: &str) -> Option<u64> {
    let token = token
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(token);
    parse_snowflake(token)
}

/// Feeds console lines to the waiter and spawns command handlers until
/// `quit` or end of input, then signals gateway shutdown.
///
/// Reading pauses after each command until its handler is ready for a reply,
/// so scripted input that answers a menu on the very next line is matched.
pub async fn run_console<R>(ctx: BotContext, reader: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut handlers = JoinSet::new();
    let mut next_message_id = 1_u64;

    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read console input")?
    {
        let message = match parse_console_line(&line, next_message_id, ctx.config()) {
            ConsoleInput::Blank => continue,
            ConsoleInput::Quit => break,
            ConsoleInput::Message(message) => message,
        };
        next_message_id += 1;

        let fulfilled = ctx.waiter().dispatch(&message);
        debug!(
            message_id = message.message_id,
            author_id = message.author_id,
            fulfilled,
            "dispatched console message"
        );
        if let Some(command) = Command::parse(&message.content, &ctx.config().prefix) {
            let (checkpoint, reached) = Checkpoint::new();
            let ctx = ctx.clone();
            handlers.spawn(async move {
                if let Err(error) = run_command(&ctx, &message, command, checkpoint).await {
                    warn!(error = %error, "command handler failed");
                }
            });
            // The next line may answer this command, so hold it until the
            // handler has registered its reply wait or finished.
            let _ = reached.await;
        }
    }

    info!("console input closed; dispatching gateway shutdown");
    ctx.waiter().dispatch(&GatewayShutdown);
    while let Some(joined) = handlers.join_next().await {
        if let Err(error) = joined {
            warn!(error = %error, "command task did not complete");
        }
    }
    info!(stats = ?ctx.waiter().stats(), "console session finished");
    Ok(())
}

/// Writes replies to stdout, tagged with the channel they were sent to.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReplier;

#[async_trait]
impl Replier for ConsoleReplier {
    async fn reply(&self, channel_id: u64, content: String) -> Result<()> {
        println!("[#{channel_id}] {content}");
        Ok(())
    }
}
