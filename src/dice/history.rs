//! Bounded roll history.

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::trace;

use crate::dice::types::RollOutcome;

/// Most entries kept; older ones are evicted first.
pub const HISTORY_CAPACITY: usize = 20;

/// A finalized roll as shown in history listings.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub notation: String,
    pub outcome: RollOutcome,
    /// Caller-supplied purpose ("attack", "skill: wisdom"); never interpreted.
    pub roll_label: String,
    pub timestamp_millis: u64,
}

impl HistoryEntry {
    /// Entry stamped with the current wall-clock time.
    pub fn now(notation: impl Into<String>, outcome: RollOutcome, roll_label: impl Into<String>) -> Self {
        let timestamp_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            notation: notation.into(),
            outcome,
            roll_label: roll_label.into(),
            timestamp_millis,
        }
    }
}

/// FIFO buffer of the last [`HISTORY_CAPACITY`] rolls, oldest first.
#[derive(Clone, Debug, Default)]
pub struct RollHistory {
    entries: VecDeque<HistoryEntry>,
}

impl RollHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append, evicting the oldest entry first when full.
    pub fn record(&mut self, entry: HistoryEntry) {
        if self.entries.len() >= HISTORY_CAPACITY {
            if let Some(evicted) = self.entries.pop_front() {
                trace!(notation = %evicted.notation, "history entry evicted");
            }
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in recording order. Reversing for display is up to the caller.
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
