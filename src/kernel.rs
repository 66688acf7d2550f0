//! # Kernel
//!
//! The embedded super-loop. Firmware builds one [`Scheduler`], hands clones
//! to its components during setup, then gives control to [`run`]:
//!
//! ```text
//! reset_handler (cortex-m-rt)
//!   └─► main()
//!         ├─► configure SysTick        ← clock source
//!         ├─► Scheduler::new(&MONOTONIC)
//!         ├─► component setup (×N)     ← schedule_timeout / schedule_interval
//!         └─► kernel::run()            ← no return
//!               └─► loop {
//!                     scheduler.dispatch()
//!                     idle(next_due_in)   ← e.g. WFI
//!                   }
//! ```

use log::warn;

use crate::scheduler::Scheduler;
use crate::time::Clock;

/// One super-loop iteration: run a dispatch pass, then hand the time until
/// the next due item to `idle`. Returns the number of actions invoked.
pub fn poll<C, F>(scheduler: &Scheduler<C>, idle: &mut F) -> usize
where
    C: Clock,
    F: FnMut(Option<u32>),
{
    let fired = match scheduler.dispatch() {
        Ok(fired) => fired,
        Err(err) => {
            warn!("poll: dispatch failed: {}", err);
            0
        }
    };
    idle(scheduler.next_due_in());
    fired
}

/// Run the super-loop forever.
pub fn run<C, F>(scheduler: &Scheduler<C>, mut idle: F) -> !
where
    C: Clock,
    F: FnMut(Option<u32>),
{
    loop {
        poll(scheduler, &mut idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    #[test]
    fn test_poll_reports_next_due() {
        let clock = ManualClock::new(0);
        let scheduler = Scheduler::new(clock.clone());
        let owner = scheduler.register_owner();
        let fired = Rc::new(Cell::new(0));

        let count = Rc::clone(&fired);
        scheduler
            .schedule_interval(owner, "blink", 250, move || count.set(count.get() + 1))
            .unwrap();

        let waits = RefCell::new(Vec::new());
        let mut idle = |next: Option<u32>| waits.borrow_mut().push(next);

        assert_eq!(poll(&scheduler, &mut idle), 0);
        clock.advance(250);
        assert_eq!(poll(&scheduler, &mut idle), 1);
        clock.advance(100);
        assert_eq!(poll(&scheduler, &mut idle), 0);

        assert_eq!(*waits.borrow(), vec![Some(250), Some(250), Some(150)]);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_poll_idles_without_work() {
        let scheduler = Scheduler::new(ManualClock::new(0));
        let mut seen = Some(1);
        assert_eq!(poll(&scheduler, &mut |next| seen = next), 0);
        assert_eq!(seen, None);
    }
}
