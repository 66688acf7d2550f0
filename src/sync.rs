//! # Synchronization Primitives
//!
//! Interrupt-safe state shared between the SysTick handler and the main
//! loop. The scheduler itself never leaves the main loop; only the clock
//! counter crosses into interrupt context.
//!
//! On Cortex-M the critical section is provided by `cortex-m`'s
//! single-core implementation (interrupts masked). Host builds use the
//! `std` implementation of the `critical-section` crate.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};

/// Execute a closure within a critical section.
///
/// # Usage
/// ```ignore
/// sync::critical_section(|cs| {
///     // Access shared state safely
/// });
/// ```
///
/// Keep the closure short: interrupts stay masked for its whole duration.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(CriticalSection<'_>) -> R,
{
    critical_section::with(f)
}

/// A `Copy` value that may be read and written from both thread and
/// interrupt context. Every access takes a critical section.
pub struct IrqCell<T: Copy> {
    inner: Mutex<Cell<T>>,
}

impl<T: Copy> IrqCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(value)),
        }
    }

    #[inline]
    pub fn get(&self) -> T {
        critical_section(|cs| self.inner.borrow(cs).get())
    }

    #[inline]
    pub fn set(&self, value: T) {
        critical_section(|cs| self.inner.borrow(cs).set(value));
    }

    /// Read-modify-write as one atomic step. Returns the new value.
    #[inline]
    pub fn update(&self, f: impl FnOnce(T) -> T) -> T {
        critical_section(|cs| {
            let cell = self.inner.borrow(cs);
            let next = f(cell.get());
            cell.set(next);
            next
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irq_cell_update() {
        let cell = IrqCell::new(5u32);
        assert_eq!(cell.get(), 5);
        assert_eq!(cell.update(|v| v.wrapping_add(u32::MAX)), 4);
        cell.set(9);
        assert_eq!(cell.get(), 9);
    }
}
