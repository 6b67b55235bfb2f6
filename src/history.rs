//! Bounded undo history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::engine::{Board, Score};

/// Board and score as they were before a committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Board,
    pub score: Score,
}

/// Fixed-capacity stack of snapshots; the oldest entry is dropped on overflow.
#[derive(Debug, Clone, Default)]
pub struct History {
    capacity: usize,
    entries: VecDeque<Snapshot>,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        History { capacity, entries: VecDeque::with_capacity(capacity) }
    }

    #[inline]
    pub fn capacity(&self) -> usize { self.capacity }

    #[inline]
    pub fn len(&self) -> usize { self.entries.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Record a snapshot. With capacity 0 nothing is kept.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        self.trim();
    }

    /// Remove and return the most recent snapshot.
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn peek(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    /// Change the capacity, dropping the oldest entries if it shrank.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}
