use anyhow::Result;
use encore_finder::{Candidate, Channel, Member, Role, NO_TAG_SENTINEL};
use encore_menu::{
    begin_choice, Choice, MenuError, MessageReceived, Resolution, SelectionMenu, SelectionRequest,
};
use encore_waiter::WaiterError;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::catalog::Track;
use crate::context::BotContext;
use crate::queue::QueueEntry;

const PENDING_SELECTION_REPLY: &str = "You already have a pending selection.";

/// `(name, arguments, help)` for every command, in help order.
const COMMAND_HELP: &[(&str, &str, &str)] = &[
    ("forceremove", "<user>", "removes all entries by a user from the queue"),
    ("search", "<query>", "searches the track catalog and queues a result"),
    ("role", "<query>", "looks up a role by mention, id, or name"),
    ("channel", "<query>", "looks up a text channel by mention, id, or name"),
    ("voice", "<query>", "looks up a voice channel by id or name"),
    ("queue", "", "shows the current queue"),
    ("help", "", "shows this list"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ForceRemove(String),
    Search(String),
    Role(String),
    Channel(String),
    Voice(String),
    Queue,
    Help,
}

impl Command {
    /// Parses `content` as a prefixed command, or `None` for ordinary chat.
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        let body = content.trim().strip_prefix(prefix)?;
        let (name, args) = match body.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (body, ""),
        };
        let args = args.to_string();
        match name.to_ascii_lowercase().as_str() {
            "forceremove" | "forcedelete" | "modremove" => Some(Self::ForceRemove(args)),
            "search" | "find" => Some(Self::Search(args)),
            "role" => Some(Self::Role(args)),
            "channel" => Some(Self::Channel(args)),
            "voice" => Some(Self::Voice(args)),
            "queue" | "list" => Some(Self::Queue),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ForceRemove(_) => "forceremove",
            Self::Search(_) => "search",
            Self::Role(_) => "role",
            Self::Channel(_) => "channel",
            Self::Voice(_) => "voice",
            Self::Queue => "queue",
            Self::Help => "help",
        }
    }
}

/// Signals the event source that a handler no longer needs it paused.
///
/// Reached once the handler has registered its follow-up wait. Dropping an
/// unreached checkpoint (handler finished or failed) signals as well.
#[derive(Debug, Default)]
pub struct Checkpoint(Option<oneshot::Sender<()>>);

impl Checkpoint {
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (sender, receiver) = oneshot::channel();
        (Self(Some(sender)), receiver)
    }

    fn reach(&mut self) {
        if let Some(sender) = self.0.take() {
            let _ = sender.send(());
        }
    }
}

/// Runs `command`, reaching `checkpoint` as soon as any reply wait it needs
/// is registered.
pub async fn run_command(
    ctx: &BotContext,
    message: &MessageReceived,
    command: Command,
    mut checkpoint: Checkpoint,
) -> Result<()> {
    let checkpoint = &mut checkpoint;
    debug!(
        command = command.name(),
        author_id = message.author_id,
        channel_id = message.channel_id,
        "handling command"
    );
    match command {
        Command::ForceRemove(query) => force_remove(ctx, message, &query, checkpoint).await,
        Command::Search(query) => search(ctx, message, &query, checkpoint).await,
        Command::Role(query) => {
            let found: Vec<Role> = ctx
                .config()
                .roster
                .find_roles(&query)
                .into_iter()
                .cloned()
                .collect();
            lookup(ctx, message, &query, "role", found, checkpoint).await
        }
        Command::Channel(query) => {
            let found: Vec<Channel> = ctx
                .config()
                .roster
                .find_text_channels(&query)
                .into_iter()
                .cloned()
                .collect();
            lookup(ctx, message, &query, "channel", found, checkpoint).await
        }
        Command::Voice(query) => {
            let found: Vec<Channel> = ctx
                .config()
                .roster
                .find_voice_channels(&query)
                .into_iter()
                .cloned()
                .collect();
            lookup(ctx, message, &query, "voice channel", found, checkpoint).await
        }
        Command::Queue => show_queue(ctx, message).await,
        Command::Help => {
            let help = render_help(&ctx.config().prefix);
            ctx.reply(message.channel_id, help).await
        }
    }
}

/// `**name**#discriminator`, dropping the tag for untagged accounts.
pub fn format_username(member: &Member) -> String {
    match member.discriminator.as_deref() {
        Some(tag) if !tag.is_empty() && tag != NO_TAG_SENTINEL => {
            format!("**{}**#{tag}", member.username)
        }
        _ => format!("**{}**", member.username),
    }
}

pub fn render_help(prefix: &str) -> String {
    let mut help = String::from("Commands:");
    for (name, args, summary) in COMMAND_HELP {
        let usage = if args.is_empty() {
            format!("{prefix}{name}")
        } else {
            format!("{prefix}{name} {args}")
        };
        help.push_str(&format!("\n`{usage}` - {summary}"));
    }
    help
}

async fn force_remove(
    ctx: &BotContext,
    message: &MessageReceived,
    query: &str,
    checkpoint: &mut Checkpoint,
) -> Result<()> {
    let channel_id = message.channel_id;
    if query.is_empty() {
        return ctx.reply(channel_id, "You need to mention a user!").await;
    }
    let queue_empty = ctx.queue().is_empty();
    if queue_empty {
        return ctx.reply(channel_id, "There is nothing in the queue!").await;
    }

    let found: Vec<Member> = ctx
        .config()
        .roster
        .find_members(query)
        .into_iter()
        .cloned()
        .collect();
    let target = match Resolution::from_matches(found) {
        Resolution::NotFound => return ctx.reply(channel_id, "Unable to find the user!").await,
        Resolution::Unique(member) => member,
        Resolution::Ambiguous(members) => {
            match present_menu(
                ctx,
                message,
                "Found multiple users:".to_string(),
                members,
                format_username,
                checkpoint,
            )
            .await?
            {
                Some(Choice::Picked(member)) => member,
                Some(Choice::Cancelled | Choice::TimedOut) | None => return Ok(()),
            }
        }
    };

    let removed = ctx.queue().remove_all(target.id);
    info!(target_id = target.id, removed, "force-removed queue entries");
    let reply = if removed == 0 {
        format!("**{}** doesn't have any songs in the queue!", target.username)
    } else {
        format!(
            "Successfully removed `{removed}` entries from {}.",
            format_username(&target)
        )
    };
    ctx.reply(channel_id, reply).await
}

async fn search(
    ctx: &BotContext,
    message: &MessageReceived,
    query: &str,
    checkpoint: &mut Checkpoint,
) -> Result<()> {
    let channel_id = message.channel_id;
    if query.is_empty() {
        return ctx.reply(channel_id, "Please include a query.").await;
    }

    let found: Vec<Track> = ctx
        .catalog()
        .search(query, ctx.config().max_menu_options)
        .into_iter()
        .cloned()
        .collect();
    let track = match Resolution::from_matches(found) {
        Resolution::NotFound => {
            return ctx
                .reply(channel_id, format!("No results found for `{query}`."))
                .await
        }
        Resolution::Unique(track) => track,
        Resolution::Ambiguous(tracks) => {
            let header = format!("Search results for `{query}`:");
            match present_menu(
                ctx,
                message,
                header,
                tracks,
                |track| format!("**{}**", track.title),
                checkpoint,
            )
            .await?
            {
                Some(Choice::Picked(track)) => track,
                Some(Choice::Cancelled) => return ctx.reply(channel_id, "Search cancelled.").await,
                Some(Choice::TimedOut) => return ctx.reply(channel_id, "Search timed out.").await,
                None => return Ok(()),
            }
        }
    };

    let position = ctx
        .queue()
        .push(QueueEntry::new(track.title.clone(), message.author_id));
    ctx.reply(
        channel_id,
        format!("Added **{}** to the queue at position {position}.", track.title),
    )
    .await
}

async fn lookup<C>(
    ctx: &BotContext,
    message: &MessageReceived,
    query: &str,
    noun: &str,
    found: Vec<C>,
    checkpoint: &mut Checkpoint,
) -> Result<()>
where
    C: Candidate + Send,
{
    let channel_id = message.channel_id;
    if query.is_empty() {
        return ctx
            .reply(channel_id, format!("Please include a {noun} to look up."))
            .await;
    }

    let entity = match Resolution::from_matches(found) {
        Resolution::NotFound => {
            return ctx
                .reply(channel_id, format!("No {noun}s found matching `{query}`."))
                .await
        }
        Resolution::Unique(entity) => entity,
        Resolution::Ambiguous(entities) => {
            let header = format!("Found multiple {noun}s:");
            match present_menu(
                ctx,
                message,
                header,
                entities,
                |entity| format!("**{}** (`{}`)", entity.name(), entity.id()),
                checkpoint,
            )
            .await?
            {
                Some(Choice::Picked(entity)) => entity,
                Some(Choice::Cancelled) => return ctx.reply(channel_id, "Selection cancelled.").await,
                Some(Choice::TimedOut) => return ctx.reply(channel_id, "Selection timed out.").await,
                None => return Ok(()),
            }
        }
    };
    ctx.reply(
        channel_id,
        format!("Found {noun} **{}** (`{}`).", entity.name(), entity.id()),
    )
    .await
}

async fn show_queue(ctx: &BotContext, message: &MessageReceived) -> Result<()> {
    let listing = {
        let queue = ctx.queue();
        if queue.is_empty() {
            None
        } else {
            let roster = &ctx.config().roster;
            let mut listing = format!("Current queue (`{}` entries):", queue.len());
            for (index, entry) in queue.entries().iter().enumerate() {
                let requester = roster
                    .member(entry.requester_id)
                    .map(|member| member.effective_name().to_string())
                    .unwrap_or_else(|| entry.requester_id.to_string());
                listing.push_str(&format!(
                    "\n`{}` **{}** requested by {requester}",
                    index + 1,
                    entry.title
                ));
            }
            Some(listing)
        }
    };
    let reply = listing.unwrap_or_else(|| "There is nothing in the queue!".to_string());
    ctx.reply(message.channel_id, reply).await
}

/// Shows a numbered menu and waits for the author's pick.
///
/// The reply wait is registered before the menu is sent. Returns `None` when
/// the author already has a menu open in this channel (after telling them
/// so) or when the waiter shut down mid-selection.
async fn present_menu<T, L>(
    ctx: &BotContext,
    message: &MessageReceived,
    header: String,
    mut options: Vec<T>,
    label: L,
    checkpoint: &mut Checkpoint,
) -> Result<Option<Choice<T>>>
where
    T: Send,
    L: Fn(&T) -> String,
{
    let flow_key = format!("{}/{}", message.channel_id, message.author_id);
    let Some(_permit) = ctx.flows().try_begin(flow_key) else {
        ctx.reply(message.channel_id, PENDING_SELECTION_REPLY).await?;
        return Ok(None);
    };

    let max_options = ctx.config().max_menu_options;
    options.truncate(max_options);
    let menu = SelectionMenu::new(header, max_options).with_options(options.iter().map(label));
    let request = SelectionRequest::new(
        message.author_id,
        message.channel_id,
        ctx.config().selection_timeout(),
    );
    let pending = match begin_choice(ctx.waiter(), request, options) {
        Ok(pending) => pending,
        Err(error) => return abandoned(message, error),
    };
    checkpoint.reach();
    ctx.reply(message.channel_id, menu.render()).await?;

    match pending.resolve().await {
        Ok(choice) => Ok(Some(choice)),
        Err(error) => abandoned(message, error),
    }
}

fn abandoned<T>(message: &MessageReceived, error: MenuError) -> Result<Option<Choice<T>>> {
    match error {
        MenuError::Waiter(WaiterError::ShutDown | WaiterError::Cancelled) => {
            debug!(
                author_id = message.author_id,
                "selection abandoned because the waiter shut down"
            );
            Ok(None)
        }
        error => Err(error.into()),
    }
}
