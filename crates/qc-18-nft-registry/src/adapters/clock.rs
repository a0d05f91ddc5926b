//! # Clock Adapters

use crate::domain::value_objects::Timestamp;
use crate::ports::outbound::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Set the reading, in either direction.
    ///
    /// Moving backwards is meant for tests and simulations; use
    /// [`ManualClock::increase_to`] where time must stay monotonic.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `secs`. Returns the new reading.
    pub fn advance(&self, secs: u64) -> Timestamp {
        let previous = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            })
            .unwrap_or_default();
        previous.saturating_add(secs)
    }

    /// Jump to `target`.
    ///
    /// Returns false (and leaves the clock unchanged) if `target` lies in the past.
    pub fn increase_to(&self, target: Timestamp) -> bool {
        self.now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                (target >= t).then_some(target)
            })
            .is_ok()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_recent() {
        // 2023-11-14
        assert!(SystemClock.now() > 1_700_000_000);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        assert_eq!(clock.advance(50), 150);
        assert_eq!(clock.now(), 150);
    }

    #[test]
    fn test_manual_clock_increase_to() {
        let clock = ManualClock::new(100);
        assert!(clock.increase_to(1_000));
        assert_eq!(clock.now(), 1_000);

        assert!(!clock.increase_to(999));
        assert_eq!(clock.now(), 1_000);

        assert!(clock.increase_to(1_000));
    }

    #[test]
    fn test_manual_clock_set_moves_backwards() {
        let clock = ManualClock::new(500);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_manual_clock_saturates() {
        let clock = ManualClock::new(u64::MAX - 1);
        assert_eq!(clock.advance(10), u64::MAX);
    }
}
