//! # Scheduled Item
//!
//! One pending unit of work. Items are exclusively owned by the scheduler
//! from insertion until they fire (one-shot), are cancelled, or are
//! replaced by a new item with the same key.
//!
//! ## Lifecycle
//!
//! ```text
//!   schedule_*()        due & collected         action returns
//!  ─────────────► Queued ───────────────► Firing ──────────────► (dropped)
//!                   ▲  │                    │          OneShot
//!                   │  │ cancel / replace   │ Repeating: requeued before
//!                   │  ▼                    │ the action runs, action put
//!                   │ (dropped)             │ back once it returns
//!                   └───────────────────────┘
//! ```

use alloc::boxed::Box;
use core::fmt;

use crate::key::TimerKey;

/// The work attached to an item. Owns whatever state it captured.
pub type Action = Box<dyn FnMut()>;

/// Whether an item fires once or keeps firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    OneShot,
    /// Fires every `period` ms. The scheduler never builds one with a
    /// zero period.
    Repeating { period: u32 },
}

impl ItemKind {
    #[inline]
    pub fn is_repeating(&self) -> bool {
        matches!(self, ItemKind::Repeating { .. })
    }

    /// Period in ms, or 0 for a one-shot item.
    #[inline]
    pub fn period(&self) -> u32 {
        match self {
            ItemKind::OneShot => 0,
            ItemKind::Repeating { period } => *period,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::OneShot => f.write_str("timeout"),
            ItemKind::Repeating { period } => write!(f, "interval({}ms)", period),
        }
    }
}

/// A pending unit of work.
pub struct ScheduledItem {
    /// Uniqueness key: owner plus namespaced id.
    pub(crate) key: TimerKey,

    pub(crate) kind: ItemKind,

    /// Absolute due time in the wrapping millisecond domain.
    pub(crate) due_at: u32,

    /// Insertion sequence number. Breaks ties between equal due times and
    /// doubles as the generation of the key: a replaced item never shares
    /// its sequence with the item that replaced it.
    pub(crate) seq: u64,

    /// `None` while the action is executing. A repeating item sits in the
    /// queue in that state until its action returns.
    pub(crate) action: Option<Action>,
}

impl ScheduledItem {
    pub(crate) fn new(key: TimerKey, kind: ItemKind, due_at: u32, seq: u64, action: Action) -> Self {
        Self {
            key,
            kind,
            due_at,
            seq,
            action: Some(action),
        }
    }

    #[inline]
    pub fn key(&self) -> &TimerKey {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    #[inline]
    pub fn due_at(&self) -> u32 {
        self.due_at
    }

    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// True while the item's action is running.
    #[inline]
    pub fn is_executing(&self) -> bool {
        self.action.is_none()
    }

    /// Move the action out for execution, marking the item as executing.
    #[inline]
    pub(crate) fn take_action(&mut self) -> Option<Action> {
        self.action.take()
    }

    /// Hand the action back after it ran, unless the item was swapped out
    /// in the meantime. Returns the action when it was not accepted.
    pub(crate) fn restore_action(&mut self, seq: u64, action: Action) -> Result<(), Action> {
        if self.seq != seq || self.action.is_some() {
            return Err(action);
        }
        self.action = Some(action);
        Ok(())
    }
}

impl fmt::Debug for ScheduledItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledItem")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("due_at", &self.due_at)
            .field("seq", &self.seq)
            .field("executing", &self.is_executing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::OwnerId;

    fn item(seq: u64, kind: ItemKind) -> ScheduledItem {
        ScheduledItem::new(TimerKey::new(OwnerId::new(1), 1u32), kind, 100, seq, Box::new(|| {}))
    }

    #[test]
    fn test_kind_period() {
        assert_eq!(ItemKind::OneShot.period(), 0);
        assert!(!ItemKind::OneShot.is_repeating());
        assert_eq!(ItemKind::Repeating { period: 250 }.period(), 250);
        assert!(ItemKind::Repeating { period: 250 }.is_repeating());
    }

    #[test]
    fn test_take_marks_executing() {
        let mut item = item(3, ItemKind::OneShot);
        assert!(!item.is_executing());
        let action = item.take_action();
        assert!(action.is_some());
        assert!(item.is_executing());
        assert!(item.take_action().is_none());
    }

    #[test]
    fn test_restore_requires_matching_generation() {
        let mut item = item(3, ItemKind::Repeating { period: 10 });
        let action = item.take_action().unwrap();

        let action = item.restore_action(4, action).unwrap_err();
        assert!(item.is_executing());

        assert!(item.restore_action(3, action).is_ok());
        assert!(!item.is_executing());
    }

    #[test]
    fn test_restore_rejects_when_action_present() {
        let mut item = item(5, ItemKind::OneShot);
        assert!(item.restore_action(5, Box::new(|| {})).is_err());
    }
}
