//! Timestamp type used throughout the subsystem.
//!
//! Timestamps are Unix epoch seconds (UTC). Election windows and audit
//! time-range filters all compare in this unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp moved back by the given number of minutes (saturating).
    pub fn minus_minutes(&self, minutes: u64) -> Self {
        Self(self.0.saturating_sub(minutes * 60))
    }

    /// This timestamp moved back by the given number of hours (saturating).
    pub fn minus_hours(&self, hours: u64) -> Self {
        Self(self.0.saturating_sub(hours * 3600))
    }

    /// Whether this timestamp falls within the inclusive window `[start, end]`.
    pub fn is_within(&self, start: Timestamp, end: Timestamp) -> bool {
        *self >= start && *self <= end
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// A source of the current time.
///
/// Production code uses [`SystemClock`]; tests use [`ManualClock`] so that
/// election windows and audit time filters are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A deterministic clock for testing. Time only advances when you tell it to.
#[derive(Debug)]
pub struct ManualClock {
    current: std::sync::atomic::AtomicU64,
}

impl ManualClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: std::sync::atomic::AtomicU64::new(initial_secs),
        }
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current
            .fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current
            .store(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(std::sync::atomic::Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_inclusive() {
        let t = Timestamp::new(100);
        assert!(t.is_within(Timestamp::new(100), Timestamp::new(200)));
        assert!(t.is_within(Timestamp::new(50), Timestamp::new(100)));
        assert!(!t.is_within(Timestamp::new(101), Timestamp::new(200)));
    }

    #[test]
    fn minus_saturates_at_epoch() {
        assert_eq!(Timestamp::new(60).minus_minutes(2), Timestamp::EPOCH);
        assert_eq!(Timestamp::new(7200).minus_hours(1), Timestamp::new(3600));
    }

    #[test]
    fn manual_clock_advances_on_demand() {
        let clock = ManualClock::new(1000);
        assert_eq!(clock.now(), Timestamp::new(1000));
        clock.advance(30);
        assert_eq!(clock.now(), Timestamp::new(1030));
        clock.set(5);
        assert_eq!(clock.now(), Timestamp::new(5));
    }
}
