//! # Scheduler
//!
//! Public scheduling surface and the dispatch loop. A [`Scheduler`] is
//! created once at startup and handed to every component as a cheap
//! clonable handle; clones share one queue.
//!
//! ## Dispatch Pass
//!
//! Each call to [`Scheduler::dispatch`], made once per main-loop
//! iteration:
//! 1. **Collect**: read `now` once and pop every item whose due time has
//!    been reached into the due-list. Items added later in the pass never
//!    join this snapshot, so a pass always terminates.
//! 2. **Execute**: take items off the due-list in firing order. For each,
//!    first do the bookkeeping (drop a one-shot, requeue a repeating item
//!    at its next due time), then run the action with no borrow of the
//!    scheduler held, so the action may freely schedule or cancel.
//!
//! ## Missed Ticks
//!
//! A repeating item is due again at `due_at + period`. When the pass runs
//! late enough that this is already in the past, whole periods are skipped
//! until the next due time is in the future. The item fires once for the
//! stall, never in a burst.
//!
//! ## Cancellation
//!
//! `cancel` searches both the queue and the current due-list, so a `true`
//! result guarantees the item will not fire, even when it was already
//! collected by the running pass. An action that cancels or replaces its
//! own key keeps running to completion; the change applies from the next
//! occurrence.
//!
//! ## Unwinding Actions
//!
//! A pass that unwinds out of an action still ends cleanly. A repeating
//! item whose action never returned is dropped, since its action is gone.
//! Items the pass had not reached go back into the queue and fire on the
//! next pass.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::mem;

use log::{debug, trace, warn};

use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::item::{Action, ItemKind, ScheduledItem};
use crate::key::{OwnerId, TimerId, TimerKey};
use crate::queue::TimeQueue;
use crate::time::{self, Clock, Uptime};

// ---------------------------------------------------------------------------
// Public snapshot types
// ---------------------------------------------------------------------------

/// Counters accumulated since the scheduler was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Dispatch passes run.
    pub passes: u64,
    /// Actions invoked.
    pub fired: u64,
    /// Items removed by `cancel` or `cancel_all`.
    pub cancelled: u64,
    /// Items replaced by a new schedule call with the same key.
    pub replaced: u64,
    /// Repeating occurrences dropped by the missed-tick policy.
    pub skipped_ticks: u64,
    /// Highest number of simultaneously pending items.
    pub peak_pending: usize,
}

/// Debug view of one pending item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub key: TimerKey,
    pub kind: ItemKind,
    /// Milliseconds until due; negative when overdue.
    pub due_in: i32,
    /// True while the item's own action is running.
    pub executing: bool,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct SchedulerState {
    queue: TimeQueue,

    /// Items collected by the running pass that have not fired yet.
    /// Disjoint from `queue`: a key lives in at most one of the two.
    due: VecDeque<ScheduledItem>,

    /// Repeating item whose action is running, requeued without it.
    in_flight: Option<(TimerKey, u64)>,

    next_seq: u64,
    next_owner: u32,
    dispatching: bool,
    uptime: Uptime,
    stats: SchedulerStats,
}

impl SchedulerState {
    fn new(config: &SchedulerConfig) -> Self {
        Self {
            queue: TimeQueue::with_capacity(config.queue_capacity),
            due: VecDeque::new(),
            in_flight: None,
            next_seq: 0,
            next_owner: 0,
            dispatching: false,
            uptime: Uptime::new(),
            stats: SchedulerStats::default(),
        }
    }

    fn pending_len(&self) -> usize {
        self.queue.len() + self.due.len()
    }

    fn contains(&self, key: &TimerKey) -> bool {
        self.queue.contains(key) || self.due.iter().any(|item| &item.key == key)
    }

    /// Remove `key` from wherever it is pending.
    fn take_pending(&mut self, key: &TimerKey) -> Option<ScheduledItem> {
        if let Some(item) = self.queue.remove(key) {
            return Some(item);
        }
        let pos = self.due.iter().position(|item| &item.key == key)?;
        self.due.remove(pos)
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn note_pending(&mut self) {
        let pending = self.pending_len();
        if pending > self.stats.peak_pending {
            self.stats.peak_pending = pending;
        }
    }
}

struct Inner<C> {
    clock: C,
    config: SchedulerConfig,
    state: RefCell<SchedulerState>,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Cooperative timer scheduler driven by a [`Clock`].
///
/// Not `Send`: the scheduler lives on the main loop and only the clock is
/// touched from interrupt context.
pub struct Scheduler<C: Clock> {
    inner: Rc<Inner<C>>,
}

impl<C: Clock> Clone for Scheduler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C) -> Self {
        Self::with_config(clock, SchedulerConfig::default())
    }

    pub fn with_config(clock: C, config: SchedulerConfig) -> Self {
        debug!("Scheduler::with_config: {:?}", config);
        Self {
            inner: Rc::new(Inner {
                clock,
                state: RefCell::new(SchedulerState::new(&config)),
                config,
            }),
        }
    }

    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.inner.clock
    }

    /// Current scheduler time.
    pub fn now(&self) -> u32 {
        let now = self.inner.clock.now();
        self.inner.state.borrow_mut().uptime.update(now);
        now
    }

    /// Milliseconds since the epoch of the clock, without wrapping.
    pub fn uptime_ms(&self) -> u64 {
        let now = self.inner.clock.now();
        self.inner.state.borrow_mut().uptime.update(now)
    }

    /// Allocate a fresh owner identity for a component.
    pub fn register_owner(&self) -> OwnerId {
        let mut state = self.inner.state.borrow_mut();
        state.next_owner += 1;
        OwnerId::new(state.next_owner)
    }

    // -----------------------------------------------------------------------
    // Scheduling API
    // -----------------------------------------------------------------------

    /// Run `action` once, `delay` ms from now. Replaces any item pending
    /// under the same key. A zero delay still waits for the next pass.
    pub fn schedule_timeout<F>(
        &self,
        owner: OwnerId,
        id: impl Into<TimerId>,
        delay: u32,
        action: F,
    ) -> Result<(), ScheduleError>
    where
        F: FnMut() + 'static,
    {
        let key = TimerKey::new(owner, id);
        self.schedule(key, ItemKind::OneShot, delay, Box::new(action))
    }

    /// Run `action` every `period` ms, first `period` ms from now.
    /// Replaces any item pending under the same key.
    pub fn schedule_interval<F>(
        &self,
        owner: OwnerId,
        id: impl Into<TimerId>,
        period: u32,
        action: F,
    ) -> Result<(), ScheduleError>
    where
        F: FnMut() + 'static,
    {
        let key = TimerKey::new(owner, id);
        if period == 0 {
            warn!("schedule_interval: {} rejected, zero period", key);
            return Err(ScheduleError::ZeroPeriod);
        }
        self.schedule(key, ItemKind::Repeating { period }, period, Box::new(action))
    }

    /// Run `action` on the next dispatch pass.
    pub fn defer<F>(&self, owner: OwnerId, id: impl Into<TimerId>, action: F) -> Result<(), ScheduleError>
    where
        F: FnMut() + 'static,
    {
        self.schedule_timeout(owner, id, 0, action)
    }

    fn schedule(&self, key: TimerKey, kind: ItemKind, delay: u32, action: Action) -> Result<(), ScheduleError> {
        let max = self.inner.config.effective_max_delay();
        if delay > max {
            warn!("schedule: {} rejected, {}ms exceeds {}ms horizon", key, delay, max);
            return Err(ScheduleError::DelayOutOfRange { delay, max });
        }

        let replaced = {
            let mut state = self.inner.state.borrow_mut();

            let capacity = self.inner.config.max_pending;
            if !state.contains(&key) && state.pending_len() >= capacity {
                warn!("schedule: {} rejected, {} items pending", key, capacity);
                return Err(ScheduleError::QueueFull { capacity });
            }

            let now = self.inner.clock.now();
            state.uptime.update(now);

            let replaced = state.take_pending(&key);
            if replaced.is_some() {
                state.stats.replaced += 1;
            }

            debug!("schedule: {} {} due in {}ms (replaced: {})", key, kind, delay, replaced.is_some());
            let seq = state.next_seq();
            let stale = state
                .queue
                .insert(ScheduledItem::new(key, kind, now.wrapping_add(delay), seq, action));
            debug_assert!(stale.is_none(), "take_pending left the key queued");
            state.note_pending();
            replaced
        };

        // The old action may own resources whose drop reaches back into
        // the scheduler, so it is released outside the borrow.
        drop(replaced);
        Ok(())
    }

    /// Cancel the item pending under `(owner, id)`. Returns whether one was
    /// removed. Ids in other namespaces are never affected.
    pub fn cancel(&self, owner: OwnerId, id: impl Into<TimerId>) -> bool {
        let key = TimerKey::new(owner, id);
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            let removed = state.take_pending(&key);
            if removed.is_some() {
                state.stats.cancelled += 1;
            }
            removed
        };
        debug!("cancel: {} (removed: {})", key, removed.is_some());
        removed.is_some()
    }

    /// Cancel every item of `owner` in all namespaces. Returns how many
    /// were removed.
    pub fn cancel_all(&self, owner: OwnerId) -> usize {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            let mut removed = state.queue.remove_owner(owner);

            let (mine, rest): (VecDeque<ScheduledItem>, VecDeque<ScheduledItem>) =
                mem::take(&mut state.due)
                    .into_iter()
                    .partition(|item| item.key.owner == owner);
            state.due = rest;
            removed.extend(mine);

            state.stats.cancelled += removed.len() as u64;
            removed
        };
        debug!("cancel_all: {} ({} removed)", owner, removed.len());
        removed.len()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn is_pending(&self, owner: OwnerId, id: impl Into<TimerId>) -> bool {
        let key = TimerKey::new(owner, id);
        self.inner.state.borrow().contains(&key)
    }

    /// Number of pending items, including repeating items whose action is
    /// currently running.
    pub fn len(&self) -> usize {
        self.inner.state.borrow().pending_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Milliseconds until the earliest pending item is due, 0 when one is
    /// already due, `None` when nothing is pending.
    pub fn next_due_in(&self) -> Option<u32> {
        let now = self.inner.clock.now();
        let state = self.inner.state.borrow();
        if !state.due.is_empty() {
            return Some(0);
        }
        state.queue.peek_min().map(|item| time::ticks_until(item.due_at, now))
    }

    pub fn stats(&self) -> SchedulerStats {
        self.inner.state.borrow().stats
    }

    /// Snapshot of pending items in firing order.
    pub fn pending(&self) -> Vec<PendingItem> {
        let now = self.inner.clock.now();
        let state = self.inner.state.borrow();
        state
            .due
            .iter()
            .chain(state.queue.sorted())
            .map(|item| PendingItem {
                key: item.key().clone(),
                kind: item.kind(),
                due_in: time::signed_diff(item.due_at(), now),
                executing: item.is_executing(),
            })
            .collect()
    }

    /// Write the pending items to the log at debug level.
    pub fn log_pending(&self) {
        let pending = self.pending();
        debug!("{} items pending", pending.len());
        for item in &pending {
            debug!("  {} {} due in {}ms", item.key, item.kind, item.due_in);
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Run one dispatch pass. Returns the number of actions invoked.
    ///
    /// Fails with [`ScheduleError::Reentrant`] when called from inside an
    /// action of a pass that is still running.
    pub fn dispatch(&self) -> Result<usize, ScheduleError> {
        let now = self.inner.clock.now();
        {
            let mut state = self.inner.state.borrow_mut();
            if state.dispatching {
                warn!("dispatch: called from inside a running action");
                return Err(ScheduleError::Reentrant);
            }
            state.dispatching = true;
            let wraps = state.uptime.rollovers();
            state.uptime.update(now);
            if state.uptime.rollovers() != wraps {
                debug!("dispatch: clock wrapped at uptime {}ms", state.uptime.millis());
            }
            state.stats.passes += 1;

            while let Some(item) = state.queue.pop_due(now) {
                state.due.push_back(item);
            }
            if !state.due.is_empty() {
                trace!("dispatch: {} items due at {}", state.due.len(), now);
            }
        }
        let _guard = DispatchGuard {
            state: &self.inner.state,
        };

        let mut fired = 0;
        loop {
            let (action, requeued) = {
                let mut state = self.inner.state.borrow_mut();
                let Some(mut item) = state.due.pop_front() else {
                    break;
                };

                let action = item.take_action();
                let requeued = match item.kind {
                    ItemKind::OneShot => None,
                    ItemKind::Repeating { period } => {
                        let (next, skipped) = next_due(item.due_at, period, now);
                        if skipped > 0 {
                            debug!("dispatch: {} skipped {} missed ticks", item.key, skipped);
                            state.stats.skipped_ticks += skipped as u64;
                        }
                        item.due_at = next;
                        let marker = (item.key.clone(), item.seq);
                        let stale = state.queue.insert(item);
                        debug_assert!(stale.is_none(), "due item was also queued");
                        if action.is_some() {
                            state.in_flight = Some(marker.clone());
                        }
                        Some(marker)
                    }
                };

                if action.is_some() {
                    state.stats.fired += 1;
                }
                (action, requeued)
            };

            let Some(mut action) = action else {
                continue;
            };
            action();
            fired += 1;

            if let Some((key, seq)) = requeued {
                let rejected = {
                    let mut state = self.inner.state.borrow_mut();
                    state.in_flight = None;
                    match state.queue.get_mut(&key) {
                        Some(item) => item.restore_action(seq, action).err(),
                        None => Some(action),
                    }
                };
                if rejected.is_some() {
                    trace!("dispatch: {} cancelled or replaced by its own action", key);
                }
            }
        }

        Ok(fired)
    }
}

/// Next due time of a repeating item that was due at `due_at`, and the
/// number of occurrences skipped to get past `now`.
fn next_due(due_at: u32, period: u32, now: u32) -> (u32, u32) {
    let next = due_at.wrapping_add(period);
    if !time::has_reached(next, now) {
        return (next, 0);
    }

    let behind = time::elapsed(now, next) as u64;
    let skipped = behind / period as u64 + 1;
    let next = next.wrapping_add((skipped * period as u64) as u32);
    (next, skipped as u32)
}

/// Ends a pass even if an action unwinds: clears the dispatching flag,
/// drops a repeating item whose action was lost mid-run and puts items the
/// pass never reached back into the queue.
struct DispatchGuard<'a> {
    state: &'a RefCell<SchedulerState>,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return;
        };
        state.dispatching = false;

        if let Some((key, seq)) = state.in_flight.take() {
            let orphaned = state
                .queue
                .get(&key)
                .is_some_and(|item| item.seq() == seq && item.is_executing());
            if orphaned {
                warn!("dispatch: {} dropped, its action did not return", key);
                state.queue.remove(&key);
            }
        }

        let unfired = mem::take(&mut state.due);
        for item in unfired {
            let stale = state.queue.insert(item);
            debug_assert!(stale.is_none(), "unfired item was also queued");
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use core::cell::Cell;

    fn setup() -> (ManualClock, Scheduler<ManualClock>, OwnerId) {
        let clock = ManualClock::new(1_000);
        let scheduler = Scheduler::new(clock.clone());
        let owner = scheduler.register_owner();
        (clock, scheduler, owner)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = Rc::clone(&count);
        (count, move || handle.set(handle.get() + 1))
    }

    #[test]
    fn test_next_due_without_overrun() {
        assert_eq!(next_due(100, 10, 105), (110, 0));
        assert_eq!(next_due(100, 10, 100), (110, 0));
    }

    #[test]
    fn test_next_due_skips_missed_periods() {
        // 110, 120 and 130 are in the past at 135.
        assert_eq!(next_due(100, 10, 135), (140, 3));
        // Landing exactly on now is not in the future.
        assert_eq!(next_due(100, 10, 110), (120, 1));
    }

    #[test]
    fn test_next_due_across_wrap() {
        assert_eq!(next_due(u32::MAX - 5, 10, u32::MAX), (4, 0));
        assert_eq!(next_due(u32::MAX - 5, 10, 20), (24, 2));
    }

    #[test]
    fn test_register_owner_is_unique() {
        let (_, scheduler, first) = setup();
        let second = scheduler.register_owner();
        assert_ne!(first, second);
    }

    #[test]
    fn test_zero_period_rejected() {
        let (_, scheduler, owner) = setup();
        let result = scheduler.schedule_interval(owner, 1u32, 0, || {});
        assert_eq!(result, Err(ScheduleError::ZeroPeriod));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_delay_beyond_horizon_rejected() {
        let clock = ManualClock::new(0);
        let config = SchedulerConfig::default().with_max_delay_ms(1_000);
        let scheduler = Scheduler::with_config(clock, config);
        let owner = scheduler.register_owner();

        let result = scheduler.schedule_timeout(owner, 1u32, 1_001, || {});
        assert_eq!(result, Err(ScheduleError::DelayOutOfRange { delay: 1_001, max: 1_000 }));
        assert!(scheduler.schedule_timeout(owner, 1u32, 1_000, || {}).is_ok());
    }

    #[test]
    fn test_queue_full_allows_replacement() {
        let clock = ManualClock::new(0);
        let config = SchedulerConfig::default().with_max_pending(2);
        let scheduler = Scheduler::with_config(clock, config);
        let owner = scheduler.register_owner();

        scheduler.schedule_timeout(owner, 1u32, 10, || {}).unwrap();
        scheduler.schedule_timeout(owner, 2u32, 10, || {}).unwrap();
        assert_eq!(
            scheduler.schedule_timeout(owner, 3u32, 10, || {}),
            Err(ScheduleError::QueueFull { capacity: 2 })
        );
        assert!(scheduler.schedule_timeout(owner, 2u32, 20, || {}).is_ok());
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn test_zero_delay_defers_to_next_pass() {
        let (_, scheduler, owner) = setup();
        let (count, action) = counter();

        scheduler.defer(owner, "now", action).unwrap();
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.next_due_in(), Some(0));

        assert_eq!(scheduler.dispatch(), Ok(1));
        assert_eq!(count.get(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_timeout_fires_once_when_due() {
        let (clock, scheduler, owner) = setup();
        let (count, action) = counter();

        scheduler.schedule_timeout(owner, 1u32, 50, action).unwrap();
        clock.advance(49);
        assert_eq!(scheduler.dispatch(), Ok(0));
        assert_eq!(scheduler.next_due_in(), Some(1));

        clock.advance(1);
        assert_eq!(scheduler.dispatch(), Ok(1));
        clock.advance(1_000);
        assert_eq!(scheduler.dispatch(), Ok(0));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_nested_dispatch_is_rejected() {
        let (_, scheduler, owner) = setup();
        let seen = Rc::new(Cell::new(None));

        let nested = scheduler.clone();
        let result = Rc::clone(&seen);
        scheduler
            .defer(owner, 1u32, move || result.set(Some(nested.dispatch())))
            .unwrap();

        assert_eq!(scheduler.dispatch(), Ok(1));
        assert_eq!(seen.get(), Some(Err(ScheduleError::Reentrant)));
        // The flag is cleared once the outer pass ends.
        assert_eq!(scheduler.dispatch(), Ok(0));
    }

    #[test]
    fn test_repeating_item_is_pending_while_executing() {
        let (clock, scheduler, owner) = setup();
        let observed = Rc::new(Cell::new(false));

        let inner = scheduler.clone();
        let flag = Rc::clone(&observed);
        scheduler
            .schedule_interval(owner, "tick", 10, move || {
                let executing = inner.pending().iter().any(|p| p.executing);
                flag.set(inner.is_pending(owner, "tick") && executing);
            })
            .unwrap();

        clock.advance(10);
        scheduler.dispatch().unwrap();
        assert!(observed.get());
        assert!(scheduler.pending().iter().all(|p| !p.executing));
    }

    #[test]
    fn test_unwinding_action_drops_its_interval() {
        use std::panic::{self, AssertUnwindSafe};

        let (clock, scheduler, owner) = setup();
        let (count, action) = counter();
        let mut action = action;
        scheduler
            .schedule_interval(owner, "sensor", 10, move || {
                action();
                panic!("sensor read failed");
            })
            .unwrap();

        clock.advance(10);
        let result = panic::catch_unwind(AssertUnwindSafe(|| scheduler.dispatch()));
        assert!(result.is_err());
        assert_eq!(count.get(), 1);

        // The interval is gone rather than stuck in the executing state.
        assert!(!scheduler.is_pending(owner, "sensor"));
        assert!(scheduler.pending().is_empty());
        for _ in 0..5 {
            clock.advance(10);
            assert_eq!(scheduler.dispatch(), Ok(0));
        }
        assert_eq!(count.get(), 1);

        // The key can be scheduled again.
        let (again, action) = counter();
        scheduler.schedule_interval(owner, "sensor", 10, action).unwrap();
        clock.advance(10);
        assert_eq!(scheduler.dispatch(), Ok(1));
        assert_eq!(again.get(), 1);
    }

    #[test]
    fn test_unwinding_action_requeues_unfired_items() {
        use std::panic::{self, AssertUnwindSafe};

        let (clock, scheduler, owner) = setup();
        let (count, action) = counter();
        scheduler
            .schedule_timeout(owner, 1u32, 10, || panic!("handler failed"))
            .unwrap();
        scheduler.schedule_timeout(owner, 2u32, 10, action).unwrap();

        clock.advance(10);
        let result = panic::catch_unwind(AssertUnwindSafe(|| scheduler.dispatch()));
        assert!(result.is_err());
        assert_eq!(count.get(), 0);
        assert!(scheduler.is_pending(owner, 2u32));
        assert_eq!(scheduler.len(), 1);

        // Not stuck in the dispatching state; the survivor fires next pass.
        assert_eq!(scheduler.dispatch(), Ok(1));
        assert_eq!(count.get(), 1);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_stats_track_activity() {
        let (clock, scheduler, owner) = setup();

        scheduler.schedule_interval(owner, 1u32, 10, || {}).unwrap();
        scheduler.schedule_timeout(owner, 2u32, 5, || {}).unwrap();
        scheduler.schedule_timeout(owner, 2u32, 7, || {}).unwrap();
        scheduler.schedule_timeout(owner, 3u32, 100, || {}).unwrap();
        assert!(scheduler.cancel(owner, 3u32));

        clock.advance(10);
        scheduler.dispatch().unwrap();
        clock.advance(35);
        scheduler.dispatch().unwrap();

        let stats = scheduler.stats();
        assert_eq!(stats.passes, 2);
        assert_eq!(stats.fired, 3);
        assert_eq!(stats.replaced, 1);
        assert_eq!(stats.cancelled, 1);
        // Due at 1020, run at 1045: fires once, 1030 and 1040 are dropped.
        assert_eq!(stats.skipped_ticks, 2);
        assert_eq!(stats.peak_pending, 3);
    }

    #[test]
    fn test_pending_snapshot_in_firing_order() {
        let (_, scheduler, owner) = setup();
        scheduler.schedule_timeout(owner, "late", 300, || {}).unwrap();
        scheduler.schedule_interval(owner, TimerId::internal(0), 100, || {}).unwrap();
        scheduler.schedule_timeout(owner, 9u32, 200, || {}).unwrap();

        let pending = scheduler.pending();
        let due: Vec<i32> = pending.iter().map(|p| p.due_in).collect();
        assert_eq!(due, vec![100, 200, 300]);
        assert_eq!(pending[0].kind, ItemKind::Repeating { period: 100 });
        scheduler.log_pending();
    }

    #[test]
    fn test_uptime_extends_past_wrap() {
        let clock = ManualClock::new(u32::MAX - 10);
        let scheduler = Scheduler::new(clock.clone());
        assert_eq!(scheduler.uptime_ms(), (u32::MAX - 10) as u64);
        clock.advance(20);
        assert_eq!(scheduler.uptime_ms(), (1u64 << 32) + 9);
    }
}
