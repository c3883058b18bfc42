//! Bounded, ordered activity log.
//!
//! The log used to grow forever. It is now a fixed-capacity ring: once
//! full, each append evicts the oldest entry. Retained entries always
//! keep their arrival order.

use std::collections::VecDeque;

/// Capacity used when none is configured.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 1000;

/// Append-only (from the caller's point of view) log of human-readable events.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<String>,
    capacity: usize,
    total_appended: u64,
}

impl ActivityLog {
    /// Create an empty log holding at most `capacity` entries.
    ///
    /// A capacity of zero is bumped to one so the latest event is
    /// always visible.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ActivityLog {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_ACTIVITY_CAPACITY)),
            capacity,
            total_appended: 0,
        }
    }

    /// Add an event at the end, evicting the oldest entry if full.
    pub fn append(&mut self, event: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event.into());
        self.total_appended += 1;
    }

    /// Retained entries, oldest first.
    pub fn all(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events ever appended, including evicted ones.
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        ActivityLog::with_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }
}
