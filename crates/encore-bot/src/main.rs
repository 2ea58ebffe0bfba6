use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use encore_bot::{
    load_bot_config, run_console, validate_bot_config, BotContext, ConsoleReplier,
    BOT_CONFIG_FILE_NAME,
};
use encore_waiter::{EventWaiter, GatewayShutdown, WaiterConfig};
use tokio::io::BufReader;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "encore-bot",
    version,
    about = "Console-driven music queue bot with interactive disambiguation"
)]
struct Cli {
    #[arg(
        long,
        env = "ENCORE_CONFIG",
        default_value = BOT_CONFIG_FILE_NAME,
        help = "Path to the JSON bot configuration; a missing file uses defaults"
    )]
    config: PathBuf,

    #[arg(
        long,
        env = "ENCORE_LOG_LEVEL",
        help = "Tracing filter directives; overrides RUST_LOG when set"
    )]
    log_level: Option<String>,

    #[arg(
        long,
        env = "ENCORE_PREFIX",
        help = "Command prefix overriding the configured one"
    )]
    prefix: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Keep the waiter running when the gateway reports shutdown"
    )]
    ignore_gateway_shutdown: bool,
}

fn init_tracing(log_level: Option<&str>) {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::WARN.into());
    let env_filter = match log_level {
        Some(directives) => builder.parse_lossy(directives),
        None => builder.from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = load_bot_config(&cli.config)?;
    if let Some(prefix) = cli.prefix {
        config.prefix = prefix;
        validate_bot_config(&config).context("invalid --prefix")?;
    }

    let waiter = EventWaiter::new(WaiterConfig {
        shutdown_on_gateway_shutdown: !cli.ignore_gateway_shutdown,
    })
    .context("failed to start event waiter")?;
    info!(
        prefix = %config.prefix,
        members = config.roster.members.len(),
        tracks = config.catalog.len(),
        "encore bot ready"
    );
    let ctx = BotContext::new(config, waiter, Arc::new(ConsoleReplier));

    let console = run_console(ctx.clone(), BufReader::new(tokio::io::stdin()));
    tokio::pin!(console);
    tokio::select! {
        result = &mut console => result,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("interrupt received; dispatching gateway shutdown");
                ctx.waiter().dispatch(&GatewayShutdown);
                if !ctx.waiter().is_shut_down() {
                    ctx.waiter().shutdown();
                }
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "failed to listen for interrupt");
                console.await
            }
        },
    }
}
