//! Bounded linear undo/redo timeline of whole-value snapshots.
//!
//! The timeline holds an ordered sequence of snapshots and a cursor. Recording
//! a snapshot drops everything after the cursor (the redo-able future),
//! appends, and moves the cursor to the end. `cap` bounds the number of undo
//! steps, so at most `cap + 1` snapshots are held; once exceeded the oldest
//! snapshots are discarded first.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: VecDeque<T>,
    index: usize,
    cap: usize,
}

impl<T: Clone> History<T> {
    /// Empty timeline allowing up to `cap` undo steps (minimum 1).
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self { snapshots: VecDeque::new(), index: 0, cap: cap.max(1) }
    }

    /// Discard the timeline and start over from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.snapshots.clear();
        self.snapshots.push_back(initial);
        self.index = 0;
    }

    /// Append `snapshot` after the cursor, truncating any redo-able future.
    pub fn record(&mut self, snapshot: T) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.cap + 1 {
            self.snapshots.pop_front();
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. Returns `None` (and does nothing) at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Step forward one snapshot. Returns `None` (and does nothing) at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// The snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.index)
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn cap(&self) -> usize {
        self.cap
    }
}
