//! Clock abstraction
//!
//! Progress writes are throttled and every lesson update is timestamped, so
//! the tracker reads time through [`Clock`] instead of calling the system
//! clock directly. Tests drive a [`VirtualClock`] forward by hand.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Utc};

/// Source of monotonic and wall-clock time
pub trait Clock {
    /// Monotonic instant used for throttling
    fn now(&self) -> Instant;

    /// Wall-clock time stamped onto persisted records
    fn utc_now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        (**self).utc_now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        (**self).utc_now()
    }
}

/// Production clock that uses real system time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
struct VirtualState {
    instant: Instant,
    system_time: SystemTime,
}

/// Manually advanced clock for deterministic tests
///
/// Clones share the same underlying time, so a test can hand one clone to
/// the store and keep another to advance.
#[derive(Clone, Debug)]
pub struct VirtualClock {
    state: Arc<Mutex<VirtualState>>,
    base_instant: Instant,
}

impl VirtualClock {
    /// Create a virtual clock starting at the current real time
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    /// Create a virtual clock starting at a specific time
    pub fn new_at(start_time: DateTime<Utc>) -> Self {
        let now = Instant::now();
        Self {
            state: Arc::new(Mutex::new(VirtualState {
                instant: now,
                system_time: SystemTime::from(start_time),
            })),
            base_instant: now,
        }
    }

    fn state(&self) -> MutexGuard<'_, VirtualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance time by a duration
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state();
        state.instant += duration;
        state.system_time += duration;
    }

    /// Jump wall-clock time without moving the monotonic instant
    pub fn set_utc(&self, datetime: DateTime<Utc>) {
        self.state().system_time = SystemTime::from(datetime);
    }

    /// Total virtual time elapsed since construction
    pub fn elapsed(&self) -> Duration {
        self.state().instant.duration_since(self.base_instant)
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.state().instant
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.state().system_time.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn advance_moves_both_clocks() {
        let start = DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = VirtualClock::new_at(start);
        let before = clock.now();

        clock.advance(Duration::from_secs(90));

        assert_eq!(clock.now() - before, Duration::from_secs(90));
        assert_eq!(clock.utc_now().minute(), 1);
        assert_eq!(clock.utc_now().second(), 30);
        assert_eq!(clock.elapsed(), Duration::from_secs(90));
    }

    #[test]
    fn clones_share_time() {
        let clock = VirtualClock::new();
        let handle = clock.clone();
        let before = clock.now();

        handle.advance(Duration::from_millis(250));

        assert_eq!(clock.now() - before, Duration::from_millis(250));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
