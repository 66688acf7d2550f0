//! # cosched: Cooperative Scheduler
//!
//! A timer scheduler for single-threaded firmware super-loops. Components
//! queue one-shot timeouts and periodic intervals; the main loop calls
//! [`Scheduler::dispatch`] once per iteration and every item that has come
//! due runs to completion before the call returns.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 Application Components                 │
//! ├────────────────────────────────────────────────────────┤
//! │           Scheduler API (scheduler.rs)                 │
//! │  schedule_timeout · schedule_interval · cancel · defer │
//! ├──────────────────────────┬─────────────────────────────┤
//! │  Dispatch Loop           │  Main Loop (kernel.rs)      │
//! │  ─ collect due items     │  ─ poll() · run()           │
//! │  ─ execute snapshot      │                             │
//! ├──────────────────────────┴─────────────────────────────┤
//! │        Indexed Time Queue (queue.rs)                   │
//! │     binary heap by due time · key → position index     │
//! ├────────────────────────────────────────────────────────┤
//! │   Scheduled Item (item.rs) · Identifier Key (key.rs)   │
//! ├────────────────────────────────────────────────────────┤
//! │   Monotonic Clock (time.rs) · Sync (sync.rs)           │
//! ├────────────────────────────────────────────────────────┤
//! │         Arch Port (arch/cortex_m4.rs): SysTick         │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifier Namespaces
//!
//! Items are keyed by owner plus a [`TimerId`] from one of three disjoint
//! namespaces: `Internal` (framework), `Numeric` and `Named` (component).
//! `Internal(3)` and `Numeric(3)` on the same owner never interfere.
//!
//! ## Time
//!
//! Scheduler time is a wrapping 32-bit millisecond counter. Due times are
//! compared by the sign of their wrapping difference, so the scheduler
//! keeps working across the wrap every ~49.7 days. Delays are capped at
//! 2^30 ms (~12.4 days) so that a new item and an overdue one never end up
//! 2^31 ms or more apart.
//!
//! ## Example
//!
//! ```
//! use cosched::{ManualClock, Scheduler};
//!
//! let clock = ManualClock::new(0);
//! let scheduler = Scheduler::new(clock.clone());
//! let led = scheduler.register_owner();
//!
//! scheduler.schedule_interval(led, "blink", 500, || { /* toggle */ }).unwrap();
//! clock.advance(500);
//! assert_eq!(scheduler.dispatch(), Ok(1));
//! ```
//!
//! ## Memory Model
//!
//! - `no_std` + `alloc`: each pending item is one heap slot, one index node
//!   and a boxed action
//! - `SchedulerConfig::max_pending` bounds the total
//! - Only the millisecond counter is shared with interrupt context

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arch;
pub mod config;
pub mod error;
pub mod item;
pub mod kernel;
pub mod key;
pub mod queue;
pub mod scheduler;
pub mod sync;
pub mod time;

pub use config::SchedulerConfig;
pub use error::ScheduleError;
pub use item::{ItemKind, ScheduledItem};
pub use key::{Namespace, OwnerId, TimerId, TimerKey};
pub use queue::TimeQueue;
pub use scheduler::{PendingItem, Scheduler, SchedulerStats};
pub use time::{Clock, ManualClock, TickCounter};
