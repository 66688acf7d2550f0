//! # Monotonic Clock
//!
//! Scheduler time is a 32-bit millisecond counter that wraps to zero after
//! 2^32 ms (~49.7 days). Raw values are never compared with `<` or `>`:
//! two timestamps are ordered by the sign of their wrapping difference,
//! which is correct as long as they lie less than 2^31 ms (~24.85 days)
//! apart.
//!
//! ```text
//!   0 ─────────────── now ────────── due ─────────── u32::MAX ─┐
//!   ▲                                                          │
//!   └───────────────────────── wraps ──────────────────────────┘
//!   signed_diff(due, now) > 0  → due is in the future
//!   signed_diff(due, now) <= 0 → due has been reached
//! ```

use alloc::rc::Rc;
use core::cell::Cell;

use crate::sync::IrqCell;

/// Source of the current scheduler time.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch, wrapping modulo 2^32.
    fn now(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> u32 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    #[inline]
    fn now(&self) -> u32 {
        (**self).now()
    }
}

// ---------------------------------------------------------------------------
// Wraparound-safe arithmetic
// ---------------------------------------------------------------------------

/// Signed distance from `b` to `a`. Negative when `a` is earlier than `b`.
#[inline]
pub const fn signed_diff(a: u32, b: u32) -> i32 {
    a.wrapping_sub(b) as i32
}

/// True when `a` is strictly earlier than `b`.
#[inline]
pub const fn is_before(a: u32, b: u32) -> bool {
    signed_diff(a, b) < 0
}

/// True when `due` is not later than `now`.
#[inline]
pub const fn has_reached(due: u32, now: u32) -> bool {
    signed_diff(due, now) <= 0
}

/// Milliseconds elapsed from `since` to `now`, across at most one wrap.
#[inline]
pub const fn elapsed(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Milliseconds remaining until `due`, or 0 if it has already been reached.
#[inline]
pub const fn ticks_until(due: u32, now: u32) -> u32 {
    let diff = signed_diff(due, now);
    if diff > 0 {
        diff as u32
    } else {
        0
    }
}

// ---------------------------------------------------------------------------
// Interrupt-driven counter
// ---------------------------------------------------------------------------

/// Millisecond counter advanced from the SysTick interrupt.
///
/// Declared as a `static` so the exception handler can reach it; the main
/// loop hands `&'static TickCounter` to the scheduler as its clock.
pub struct TickCounter {
    millis: IrqCell<u32>,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            millis: IrqCell::new(0),
        }
    }

    /// Advance by `ms`, wrapping at 2^32. Called from interrupt context.
    #[inline]
    pub fn advance(&self, ms: u32) -> u32 {
        self.millis.update(|now| now.wrapping_add(ms))
    }

    /// Force the counter to `ms`. Useful to start near the wrap point.
    pub fn set(&self, ms: u32) {
        self.millis.set(ms);
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TickCounter {
    #[inline]
    fn now(&self) -> u32 {
        self.millis.get()
    }
}

// ---------------------------------------------------------------------------
// Manual clock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to. Clones share the same counter, so
/// a test can keep one handle and give the other to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn new(start: u32) -> Self {
        Self {
            millis: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, ms: u32) {
        self.millis.set(ms);
    }

    /// Advance by `ms`, wrapping at 2^32. Returns the new time.
    pub fn advance(&self, ms: u32) -> u32 {
        let next = self.millis.get().wrapping_add(ms);
        self.millis.set(next);
        next
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> u32 {
        self.millis.get()
    }
}

// ---------------------------------------------------------------------------
// 64-bit uptime
// ---------------------------------------------------------------------------

/// Extends the wrapping 32-bit counter into a 64-bit uptime by counting
/// rollovers. Must be fed at least once per wrap period.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uptime {
    last: u32,
    rollovers: u32,
}

impl Uptime {
    pub const fn new() -> Self {
        Self { last: 0, rollovers: 0 }
    }

    /// Record a fresh clock sample and return the extended uptime.
    pub fn update(&mut self, now: u32) -> u64 {
        // A monotonic counter that moved backwards has wrapped.
        if now < self.last {
            self.rollovers = self.rollovers.wrapping_add(1);
        }
        self.last = now;
        self.millis()
    }

    /// Uptime as of the last sample.
    #[inline]
    pub fn millis(&self) -> u64 {
        ((self.rollovers as u64) << 32) | self.last as u64
    }

    #[inline]
    pub fn rollovers(&self) -> u32 {
        self.rollovers
    }
}
