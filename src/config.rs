//! # cosched Configuration
//!
//! Compile-time constants for the clock and the firmware image, plus the
//! runtime [`SchedulerConfig`] handed to [`Scheduler::with_config`].
//!
//! [`Scheduler::with_config`]: crate::scheduler::Scheduler::with_config

/// SysTick frequency in Hz. One tick is one millisecond of scheduler time.
pub const TICK_HZ: u32 = 1000;

/// Milliseconds added to the monotonic counter per SysTick interrupt.
pub const MS_PER_TICK: u32 = 1000 / TICK_HZ;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;

/// Largest delay or period accepted by the scheduler, in milliseconds.
///
/// Due times are ordered by the sign of their wrapping difference, which is
/// only meaningful for timestamps less than 2^31 ms (~24.85 days) apart.
/// Half of that range is left for items that are overdue when a new one is
/// scheduled, so ordering holds as long as no item waits more than 2^30 ms
/// (~12.4 days) past its due time for a dispatch pass.
pub const MAX_DELAY_MS: u32 = 1 << 30;

/// Default upper bound on simultaneously pending items.
/// Each pending item costs one heap slot, one index node and a boxed action.
pub const DEFAULT_MAX_PENDING: usize = 64;

/// Default number of heap slots reserved up front.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// Size of the firmware heap region handed to the global allocator.
pub const HEAP_SIZE: usize = 8 * 1024;

/// Runtime limits of a [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum number of pending items. Scheduling a new key beyond this
    /// fails with [`ScheduleError::QueueFull`](crate::error::ScheduleError::QueueFull);
    /// replacing an already pending key is always allowed.
    pub max_pending: usize,

    /// Heap slots reserved when the scheduler is created.
    pub queue_capacity: usize,

    /// Largest accepted delay or period. Clamped to [`MAX_DELAY_MS`].
    pub max_delay_ms: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_delay_ms: MAX_DELAY_MS,
        }
    }
}

impl SchedulerConfig {
    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_max_delay_ms(mut self, max_delay_ms: u32) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// The delay limit actually enforced, never above [`MAX_DELAY_MS`].
    #[inline]
    pub fn effective_max_delay(&self) -> u32 {
        self.max_delay_ms.min(MAX_DELAY_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_pending, DEFAULT_MAX_PENDING);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.max_delay_ms, MAX_DELAY_MS);
    }

    #[test]
    fn test_max_delay_is_clamped() {
        let config = SchedulerConfig::default().with_max_delay_ms(u32::MAX);
        assert_eq!(config.effective_max_delay(), MAX_DELAY_MS);

        let config = SchedulerConfig::default().with_max_delay_ms(60_000);
        assert_eq!(config.effective_max_delay(), 60_000);
    }

    #[test]
    fn test_ms_per_tick() {
        assert_eq!(MS_PER_TICK * TICK_HZ, 1000);
    }
}
