//! Time source used for issuing and checking tokens
//!
//! Strategies never call `Utc::now()` directly; they ask a [`Clock`]. Production
//! code uses [`SystemClock`], tests drive expiry with [`MockClock`].

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock
///
/// Clones share the same instant, so a test can hand one clone to a strategy
/// and keep another to move time forward.
///
/// ```rust
/// use chrono::Duration;
/// use sesame_core::clock::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// let start = clock.now();
/// clock.advance(Duration::minutes(5));
/// assert_eq!(clock.now() - start, Duration::minutes(5));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a clock frozen at the current wall clock time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a clock frozen at the given instant
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_moves() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }

    #[test]
    fn test_mock_clock_is_frozen() {
        let clock = MockClock::new();
        let a = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(clock.now(), a);
    }

    #[test]
    fn test_mock_clock_clones_share_time() {
        let clock = MockClock::at(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let handle = clock.clone();

        handle.advance(Duration::seconds(301));
        assert_eq!(clock.now().timestamp(), 1_700_000_301);

        handle.set(DateTime::from_timestamp(0, 0).unwrap());
        assert_eq!(clock.now().timestamp(), 0);
    }
}
