//! # Indexed Time Queue
//!
//! Ordering and lookup engine of the scheduler: a binary min-heap of
//! [`ScheduledItem`]s ordered by due time, plus an index from
//! [`TimerKey`] to heap position kept in lock-step with every move.
//!
//! ```text
//!   index (BTreeMap)              heap (Vec, min at 0)
//!   ┌─────────────────────┐       ┌────┬────┬────┬────┬────┐
//!   │ owner#1/numeric:7 ──┼──────►│ 0  │ 1  │ 2  │ 3  │ 4  │
//!   │ owner#1/named:"a" ──┼───┐   └────┴────┴────┴────┴────┘
//!   │ owner#2/internal:0 ─┼─┐ └─────────────────────▲
//!   └─────────────────────┘ └──────────────▲        │
//! ```
//!
//! ## Ordering
//!
//! `a` comes before `b` when `(a.due_at - b.due_at) as i32 < 0`; equal due
//! times fall back to the insertion sequence, so same-tick items pop in
//! the order they were inserted. The wrapping comparison is a consistent
//! order only while every due time in the queue lies within 2^31 ms of the
//! others. Delays are capped at [`MAX_DELAY_MS`](crate::config::MAX_DELAY_MS)
//! (2^30), which leaves the other 2^30 ms for overdue items still waiting
//! for a dispatch pass.
//!
//! ## Complexity
//!
//! | Operation       | Cost            |
//! |-----------------|-----------------|
//! | `insert`        | O(log² n)       |
//! | `remove(key)`   | O(log² n)       |
//! | `pop_min`       | O(log² n)       |
//! | `peek_min`      | O(1)            |
//! | `contains(key)` | O(log n)        |
//!
//! Each heap swap re-points two index entries, hence the squared log.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::item::ScheduledItem;
use crate::key::{OwnerId, TimerKey};
use crate::time;

/// Min-heap of scheduled items with a key index.
#[derive(Debug, Default)]
pub struct TimeQueue {
    heap: Vec<ScheduledItem>,
    index: BTreeMap<TimerKey, usize>,
}

impl TimeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            index: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &TimerKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &TimerKey) -> Option<&ScheduledItem> {
        let pos = *self.index.get(key)?;
        self.heap.get(pos)
    }

    /// Mutable access for action bookkeeping. Callers must not touch the
    /// due time or sequence, which would break the heap order.
    pub(crate) fn get_mut(&mut self, key: &TimerKey) -> Option<&mut ScheduledItem> {
        let pos = *self.index.get(key)?;
        self.heap.get_mut(pos)
    }

    /// The earliest item, if any.
    #[inline]
    pub fn peek_min(&self) -> Option<&ScheduledItem> {
        self.heap.first()
    }

    /// Insert `item`, replacing and returning any item with the same key.
    pub fn insert(&mut self, item: ScheduledItem) -> Option<ScheduledItem> {
        let replaced = self.remove(&item.key);

        let pos = self.heap.len();
        self.index.insert(item.key.clone(), pos);
        self.heap.push(item);
        self.sift_up(pos);

        replaced
    }

    /// Remove and return the earliest item.
    pub fn pop_min(&mut self) -> Option<ScheduledItem> {
        self.remove_at(0)
    }

    /// Remove and return the earliest item if it is due at `now`.
    pub fn pop_due(&mut self, now: u32) -> Option<ScheduledItem> {
        let due = self
            .heap
            .first()
            .is_some_and(|item| time::has_reached(item.due_at, now));
        if due {
            self.remove_at(0)
        } else {
            None
        }
    }

    /// Remove the item stored under `key`.
    pub fn remove(&mut self, key: &TimerKey) -> Option<ScheduledItem> {
        let pos = *self.index.get(key)?;
        self.remove_at(pos)
    }

    /// Remove every item belonging to `owner`, in key order.
    pub fn remove_owner(&mut self, owner: OwnerId) -> Vec<ScheduledItem> {
        let keys: Vec<TimerKey> = self
            .index
            .range(TimerKey::owner_start(owner)..)
            .take_while(|(key, _)| key.owner == owner)
            .map(|(key, _)| key.clone())
            .collect();

        keys.iter().filter_map(|key| self.remove(key)).collect()
    }

    /// Items in heap order (not firing order).
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledItem> {
        self.heap.iter()
    }

    /// Items in firing order.
    pub fn sorted(&self) -> Vec<&ScheduledItem> {
        let mut items: Vec<&ScheduledItem> = self.iter().collect();
        items.sort_by(|a, b| compare(a, b));
        items
    }

    // -----------------------------------------------------------------------
    // Heap maintenance
    // -----------------------------------------------------------------------

    fn remove_at(&mut self, pos: usize) -> Option<ScheduledItem> {
        let last = self.heap.len().checked_sub(1)?;
        if pos > last {
            return None;
        }
        if pos != last {
            self.swap(pos, last);
        }

        let item = self.heap.pop()?;
        self.index.remove(&item.key);

        // The item moved into `pos` may belong above or below it.
        if pos < self.heap.len() && !self.sift_up(pos) {
            self.sift_down(pos);
        }
        Some(item)
    }

    /// Returns whether the item at `pos` moved.
    fn sift_up(&mut self, mut pos: usize) -> bool {
        let start = pos;
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !is_earlier(&self.heap[pos], &self.heap[parent]) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos != start
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && is_earlier(&self.heap[right], &self.heap[left]) {
                right
            } else {
                left
            };
            if !is_earlier(&self.heap[child], &self.heap[pos]) {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.reindex(a);
        self.reindex(b);
    }

    fn reindex(&mut self, pos: usize) {
        if let Some(slot) = self.index.get_mut(&self.heap[pos].key) {
            *slot = pos;
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        assert_eq!(self.heap.len(), self.index.len());
        for (pos, item) in self.heap.iter().enumerate() {
            assert_eq!(self.index.get(&item.key), Some(&pos), "index out of sync for {}", item.key);
            if pos > 0 {
                let parent = (pos - 1) / 2;
                assert!(
                    !is_earlier(item, &self.heap[parent]),
                    "heap order violated at {}",
                    pos
                );
            }
        }
    }
}

/// Firing order: wrapping due time, then insertion sequence.
fn compare(a: &ScheduledItem, b: &ScheduledItem) -> Ordering {
    time::signed_diff(a.due_at, b.due_at)
        .cmp(&0)
        .then_with(|| a.seq.cmp(&b.seq))
}

#[inline]
fn is_earlier(a: &ScheduledItem, b: &ScheduledItem) -> bool {
    compare(a, b) == Ordering::Less
}
