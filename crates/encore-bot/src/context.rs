use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use encore_menu::FlowGuard;
use encore_waiter::{lock_unpoisoned, EventWaiter};

use crate::catalog::TrackCatalog;
use crate::config::BotConfig;
use crate::queue::TrackQueue;

/// Outbound side of the chat transport.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, channel_id: u64, content: String) -> Result<()>;
}

/// Process-wide state shared by every command handler.
#[derive(Clone)]
pub struct BotContext {
    config: Arc<BotConfig>,
    waiter: EventWaiter,
    flows: FlowGuard,
    queue: Arc<Mutex<TrackQueue>>,
    catalog: Arc<TrackCatalog>,
    replier: Arc<dyn Replier>,
}

impl BotContext {
    pub fn new(config: BotConfig, waiter: EventWaiter, replier: Arc<dyn Replier>) -> Self {
        let queue = TrackQueue::new(config.queue.clone());
        let catalog = TrackCatalog::from_titles(config.catalog.iter().cloned());
        Self {
            config: Arc::new(config),
            waiter,
            flows: FlowGuard::new(),
            queue: Arc::new(Mutex::new(queue)),
            catalog: Arc::new(catalog),
            replier,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn waiter(&self) -> &EventWaiter {
        &self.waiter
    }

    pub fn flows(&self) -> &FlowGuard {
        &self.flows
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    /// Locks the queue. Never hold the guard across an `.await`.
    pub fn queue(&self) -> MutexGuard<'_, TrackQueue> {
        lock_unpoisoned(&self.queue)
    }

    pub async fn reply(&self, channel_id: u64, content: impl Into<String>) -> Result<()> {
        self.replier.reply(channel_id, content.into()).await
    }
}

impl std::fmt::Debug for BotContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotContext")
            .field("prefix", &self.config.prefix)
            .field("waiter", &self.waiter)
            .field("flows", &self.flows.active_count())
            .finish_non_exhaustive()
    }
}
