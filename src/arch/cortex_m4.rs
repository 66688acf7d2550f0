//! # Cortex-M4 Port Layer
//!
//! Drives the scheduler clock from SysTick. The exception handler is the
//! only code that runs in interrupt context; it advances [`MONOTONIC`]
//! and returns. All dispatching happens on the main loop.
//!
//! ## Interrupt Priorities
//!
//! SysTick runs at the lowest priority (0xFF) so it never delays
//! application interrupts. Its handler is a few instructions long.

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{SCB, SYST};
use cortex_m_rt::exception;

use crate::config::{MS_PER_TICK, SYSTEM_CLOCK_HZ, TICK_HZ};
use crate::time::TickCounter;

/// Millisecond counter advanced by SysTick. Pass `&MONOTONIC` to
/// [`Scheduler::new`](crate::scheduler::Scheduler::new) as the clock.
pub static MONOTONIC: TickCounter = TickCounter::new();

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure SysTick to fire at `TICK_HZ` from the processor clock.
pub fn configure_systick(syst: &mut SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

/// Set SysTick to the lowest interrupt priority.
pub fn set_interrupt_priorities(scb: &mut SCB) {
    // Safety: lowering a priority cannot break a priority-based critical
    // section; the only shared state is accessed under `critical_section`.
    unsafe {
        scb.set_priority(SystemHandler::SysTick, 0xFF);
    }
}

/// Sleep until the next interrupt. SysTick wakes the core every tick.
#[inline]
pub fn wait_for_interrupt() {
    cortex_m::asm::wfi();
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

#[exception]
fn SysTick() {
    MONOTONIC.advance(MS_PER_TICK);
}
