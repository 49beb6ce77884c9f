use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Local-storage key the enrollment blob lives under.
pub const DEFAULT_STORAGE_KEY: &str = "enrolledCourses";
/// Fraction of a lesson that must be watched before it counts as complete.
pub const DEFAULT_COMPLETION_RATIO: f64 = 0.90;
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1_000;

/// Tuning for the enrollment store and lesson player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Key under which the whole enrollment map is persisted.
    pub storage_key: String,
    /// Minimum spacing between throttled progress writes while a lesson
    /// plays. Bursts of position updates inside this window collapse into
    /// one write carrying the latest position.
    pub flush_interval_ms: u64,
    /// Watched fraction at which a lesson completes without waiting for the
    /// end of the stream. Must lie in `(0, 1]`.
    pub completion_ratio: f64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            completion_ratio: DEFAULT_COMPLETION_RATIO,
        }
    }
}

impl TrackerSettings {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    /// Replace out-of-range values with defaults.
    pub fn sanitized(mut self) -> Self {
        if self.storage_key.trim().is_empty() {
            warn!("empty storage_key, falling back to {DEFAULT_STORAGE_KEY:?}");
            self.storage_key = DEFAULT_STORAGE_KEY.to_string();
        }
        if !(self.completion_ratio > 0.0 && self.completion_ratio <= 1.0) {
            warn!(
                completion_ratio = self.completion_ratio,
                "completion_ratio outside (0, 1], \
                 using {DEFAULT_COMPLETION_RATIO}"
            );
            self.completion_ratio = DEFAULT_COMPLETION_RATIO;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: TrackerSettings =
            serde_json::from_str(r#"{"flush_interval_ms": 250}"#).unwrap();
        assert_eq!(settings.flush_interval(), Duration::from_millis(250));
        assert_eq!(settings.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(settings.completion_ratio, DEFAULT_COMPLETION_RATIO);
    }

    #[test]
    fn sanitized_rejects_bad_ratio() {
        let settings = TrackerSettings {
            completion_ratio: 1.5,
            storage_key: " ".into(),
            ..TrackerSettings::default()
        }
        .sanitized();
        assert_eq!(settings.completion_ratio, DEFAULT_COMPLETION_RATIO);
        assert_eq!(settings.storage_key, DEFAULT_STORAGE_KEY);

        let nan = TrackerSettings {
            completion_ratio: f64::NAN,
            ..TrackerSettings::default()
        }
        .sanitized();
        assert_eq!(nan.completion_ratio, DEFAULT_COMPLETION_RATIO);
    }
}
