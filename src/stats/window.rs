use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Fixed-capacity FIFO window over recent entries.
///
/// Backs both the win/loss result log and the point-differential log of an
/// aggregate. `push` evicts the oldest entry once the window is full; `pop`
/// removes the newest entry, which is what the reversal path needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    BoundedLog::<()>::DEFAULT_CAPACITY
}

impl<T> BoundedLog<T> {
    /// Window size shared by the result and differential logs.
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, evicting the oldest ones when the window is full.
    /// A log deserialized from a document holding more entries than the
    /// capacity shrinks back to the capacity here.
    pub fn push(&mut self, entry: T) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Removes and returns the newest entry.
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop_back()
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T> Default for BoundedLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for BoundedLog<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut log = Self::new();
        for entry in iter {
            log.push(entry);
        }
        log
    }
}
