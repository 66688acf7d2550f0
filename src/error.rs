//! Scheduler error types

use thiserror::Error;

/// Errors reported synchronously by scheduling calls.
///
/// A failed call leaves the scheduler untouched: nothing is inserted and
/// any item already pending under the same key stays pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("repeating item scheduled with a zero period")]
    ZeroPeriod,

    #[error("delay of {delay}ms exceeds the {max}ms scheduling horizon")]
    DelayOutOfRange { delay: u32, max: u32 },

    #[error("scheduler is full ({capacity} items pending)")]
    QueueFull { capacity: usize },

    #[error("dispatch called from inside a running action")]
    Reentrant,
}

impl ScheduleError {
    /// True for errors caused by the arguments of the call itself.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ScheduleError::ZeroPeriod | ScheduleError::DelayOutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_invalid_argument_classification() {
        assert!(ScheduleError::ZeroPeriod.is_invalid_argument());
        assert!(ScheduleError::DelayOutOfRange { delay: 5, max: 1 }.is_invalid_argument());
        assert!(!ScheduleError::QueueFull { capacity: 4 }.is_invalid_argument());
        assert!(!ScheduleError::Reentrant.is_invalid_argument());
    }

    #[test]
    fn test_display() {
        let err = ScheduleError::DelayOutOfRange { delay: 10, max: 5 };
        assert_eq!(err.to_string(), "delay of 10ms exceeds the 5ms scheduling horizon");
    }
}
