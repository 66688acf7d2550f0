//! # cosched Demo Firmware
//!
//! Three components sharing one scheduler:
//!
//! | Component  | Item                     | Kind     | Behavior                                   |
//! |------------|--------------------------|----------|--------------------------------------------|
//! | `led`      | `named:"blink"`          | interval | toggles every 500 ms                       |
//! | `sensor`   | `internal:0`             | interval | samples every 1000 ms, feeds the watchdog  |
//! | `sensor`   | `named:"debounce"`       | timeout  | re-armed on every high sample, fires once  |
//! | `watchdog` | `numeric:1`              | timeout  | replaced on every feed; fires if starved   |
//!
//! On `target_os = "none"` the scheduler runs off SysTick and idles with
//! WFI. On the host the same components run against a simulated clock
//! that starts just before the 32-bit wrap, with output via `env_logger`.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

extern crate alloc;

mod demo {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use log::{info, warn};

    use cosched::{Clock, OwnerId, ScheduleError, Scheduler, SchedulerConfig, TimerId};

    const BLINK_MS: u32 = 500;
    const SAMPLE_MS: u32 = 1_000;
    const DEBOUNCE_MS: u32 = 50;
    const WATCHDOG_MS: u32 = 3_500;
    const SAMPLE_TASK: TimerId = TimerId::internal(0);
    const WATCHDOG_TIMER: u32 = 1;
    const DEMO_ITEMS: usize = 4;

    /// Limits sized for the demo: four items at most, reserved up front.
    pub fn config() -> SchedulerConfig {
        SchedulerConfig::default()
            .with_queue_capacity(DEMO_ITEMS)
            .with_max_pending(DEMO_ITEMS)
    }

    /// Register the demo components and their first items.
    pub fn install<C: Clock + 'static>(scheduler: &Scheduler<C>) -> Result<(), ScheduleError> {
        let led = scheduler.register_owner();
        let sensor = scheduler.register_owner();
        let watchdog = scheduler.register_owner();

        let lit = Rc::new(Cell::new(false));
        scheduler.schedule_interval(led, "blink", BLINK_MS, move || {
            lit.set(!lit.get());
        })?;

        feed_watchdog(scheduler, watchdog)?;

        let seed = Rc::new(Cell::new(0x1234_5678u32));
        let handle = scheduler.clone();
        scheduler.schedule_interval(sensor, SAMPLE_TASK, SAMPLE_MS, move || {
            // Linear congruential stand-in for an ADC reading.
            let reading = seed.get().wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            seed.set(reading);
            let level = reading >> 24;
            info!("sensor: sample {} at {}ms", level, handle.uptime_ms());

            if level > 0x80 {
                let at = handle.now();
                let armed = handle.schedule_timeout(sensor, "debounce", DEBOUNCE_MS, move || {
                    info!("sensor: high level confirmed (armed at {}ms)", at);
                });
                if let Err(err) = armed {
                    warn!("sensor: debounce not armed: {}", err);
                }
            }

            // Starve the watchdog on every eighth sample.
            if reading & 0x7 != 0 {
                if let Err(err) = feed_watchdog(&handle, watchdog) {
                    warn!("sensor: watchdog feed failed: {}", err);
                }
            }
        })?;

        Ok(())
    }

    fn feed_watchdog<C: Clock + 'static>(scheduler: &Scheduler<C>, watchdog: OwnerId) -> Result<(), ScheduleError> {
        let handle = scheduler.clone();
        scheduler.schedule_timeout(watchdog, WATCHDOG_TIMER, WATCHDOG_MS, move || {
            warn!("watchdog: starved at {}ms, re-arming", handle.uptime_ms());
            if let Err(err) = feed_watchdog(&handle, watchdog) {
                warn!("watchdog: re-arm failed: {}", err);
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Firmware entry point
// ---------------------------------------------------------------------------

#[cfg(target_os = "none")]
mod firmware {
    use core::mem::MaybeUninit;

    use cortex_m_rt::entry;
    use linked_list_allocator::LockedHeap;
    use panic_halt as _;

    use cosched::arch::cortex_m4::{self, MONOTONIC};
    use cosched::config::HEAP_SIZE;
    use cosched::{kernel, Scheduler};

    #[global_allocator]
    static HEAP: LockedHeap = LockedHeap::empty();

    /// Firmware entry point. Sets up the heap and SysTick, installs the
    /// demo components and enters the super-loop. Does not return.
    #[entry]
    fn main() -> ! {
        static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
        HEAP.lock().init_from_slice(HEAP_MEM);

        let mut cp = cortex_m::Peripherals::take().unwrap();
        cortex_m4::configure_systick(&mut cp.SYST);
        cortex_m4::set_interrupt_priorities(&mut cp.SCB);

        let scheduler = Scheduler::with_config(&MONOTONIC, super::demo::config());
        super::demo::install(&scheduler).expect("demo components fit the default limits");

        kernel::run(&scheduler, |_| cortex_m4::wait_for_interrupt())
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "none"))]
fn main() {
    use cosched::{kernel, ManualClock, Scheduler};
    use log::{error, info};

    const SIMULATED_MS: u64 = 20_000;
    const IDLE_STEP_MS: u32 = 10;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Start two seconds before the counter wraps.
    let clock = ManualClock::new(u32::MAX - 2_000);
    let scheduler = Scheduler::with_config(clock.clone(), demo::config());
    if let Err(err) = demo::install(&scheduler) {
        error!("demo setup failed: {}", err);
        return;
    }

    let end = scheduler.uptime_ms() + SIMULATED_MS;
    while scheduler.uptime_ms() < end {
        kernel::poll(&scheduler, &mut |next| {
            clock.advance(next.unwrap_or(IDLE_STEP_MS).max(1));
        });
    }

    let stats = scheduler.stats();
    info!(
        "simulated {}ms: {} passes, {} fired, {} replaced, peak {} pending",
        SIMULATED_MS, stats.passes, stats.fired, stats.replaced, stats.peak_pending
    );
    scheduler.log_pending();
}
