//! Write throttling for playback progress
//!
//! Media surfaces report the playback position several times per second.
//! [`ProgressThrottle`] keeps only the latest value and releases at most one
//! value per interval: the first report after a quiet period is due
//! immediately, later ones are held until `last_flush + interval`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ProgressThrottle<T> {
    interval: Duration,
    pending: Option<T>,
    last_flush: Option<Instant>,
}

impl<T> ProgressThrottle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
            last_flush: None,
        }
    }

    /// Replace the pending value with `value`.
    pub fn record(&mut self, value: T) {
        self.pending = Some(value);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.pending.is_some()
            && self.last_flush.is_none_or(|last| {
                now.saturating_duration_since(last) >= self.interval
            })
    }

    /// Release the pending value if the interval has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        if !self.is_due(now) {
            return None;
        }
        self.take_now(now)
    }

    /// Release the pending value regardless of the interval, e.g. when the
    /// lesson ends or the player closes.
    pub fn take_now(&mut self, now: Instant) -> Option<T> {
        let value = self.pending.take()?;
        self.last_flush = Some(now);
        Some(value)
    }

    /// Note a write made outside the throttle so the next one is spaced
    /// from it.
    pub fn mark_flushed(&mut self, now: Instant) {
        self.last_flush = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn first_value_is_due_immediately() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::new(SECOND);

        throttle.record(1.0);
        assert!(throttle.is_due(start));
        assert_eq!(throttle.take_due(start), Some(1.0));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn burst_collapses_to_latest_value() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::new(SECOND);
        throttle.record(0.0);
        throttle.take_due(start);

        for (step, position) in [0.25, 0.5, 0.75].into_iter().enumerate() {
            throttle.record(position);
            let now = start + Duration::from_millis(250 * (step as u64 + 1));
            assert_eq!(throttle.take_due(now), None);
        }

        assert!(!throttle.is_due(start + SECOND - Duration::from_millis(1)));
        assert_eq!(throttle.take_due(start + SECOND), Some(0.75));
        assert_eq!(throttle.take_due(start + SECOND * 3), None);
    }

    #[test]
    fn take_now_ignores_interval_and_resets_window() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::new(SECOND);
        throttle.mark_flushed(start);

        throttle.record(5.0);
        assert!(!throttle.is_due(start + Duration::from_millis(10)));
        let early = start + Duration::from_millis(10);
        assert_eq!(throttle.take_now(early), Some(5.0));

        throttle.record(6.0);
        assert!(!throttle.is_due(start + SECOND));
        assert!(throttle.is_due(start + Duration::from_millis(1_010)));
    }
}
