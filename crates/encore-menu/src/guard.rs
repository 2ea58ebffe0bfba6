use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use encore_waiter::lock_unpoisoned;
use tracing::debug;

/// Tracks which interactive flows are in progress, one per key.
#[derive(Debug, Clone, Default)]
pub struct FlowGuard {
    active: Arc<Mutex<BTreeSet<String>>>,
}

impl FlowGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` busy, or returns `None` when a flow already holds it.
    pub fn try_begin(&self, key: impl Into<String>) -> Option<FlowPermit> {
        let key = key.into();
        if !lock_unpoisoned(&self.active).insert(key.clone()) {
            debug!(flow = %key, "flow already in progress");
            return None;
        }
        Some(FlowPermit {
            key,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, key: &str) -> bool {
        lock_unpoisoned(&self.active).contains(key)
    }

    pub fn active_count(&self) -> usize {
        lock_unpoisoned(&self.active).len()
    }
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct FlowPermit {
    key: String,
    active: Arc<Mutex<BTreeSet<String>>>,
}

impl Drop for FlowPermit {
    fn drop(&mut self) {
        lock_unpoisoned(&self.active).remove(&self.key);
    }
}
