use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueEntry {
    pub title: String,
    pub requester_id: u64,
}

impl QueueEntry {
    pub fn new(title: impl Into<String>, requester_id: u64) -> Self {
        Self {
            title: title.into(),
            requester_id,
        }
    }
}

/// Ordered list of pending tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackQueue {
    entries: Vec<QueueEntry>,
}

impl TrackQueue {
    pub fn new(entries: Vec<QueueEntry>) -> Self {
        Self { entries }
    }

    /// Appends an entry and returns its 1-based position.
    pub fn push(&mut self, entry: QueueEntry) -> usize {
        self.entries.push(entry);
        self.entries.len()
    }

    /// Removes every entry requested by `requester_id`, returning how many went.
    pub fn remove_all(&mut self, requester_id: u64) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.requester_id != requester_id);
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
