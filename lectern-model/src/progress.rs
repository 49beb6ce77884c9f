//! Enrollment and lesson progress records
//!
//! These types describe what a learner has watched. They are owned by the
//! enrollment store in `lectern-core`; this crate only guarantees the
//! record-level invariants:
//!
//! - **Completion latch**: once a [`LessonProgress`] is completed, no patch can
//!   clear it.
//! - **Derived count**: [`CourseProgress::completed_lessons`] is recomputed
//!   from the lesson map after every lesson mutation and on deserialization.
//!   It has no setter.
//!
//! ## Wire format
//!
//! With the `serde` feature, records use camelCase field names and RFC 3339
//! timestamps:
//!
//! ```json
//! {
//!   "courseId": "cardio-101",
//!   "enrolledAt": "2024-01-01T12:00:00Z",
//!   "lessons": {
//!     "lesson-1-1": {
//!       "lessonId": "lesson-1-1",
//!       "completed": true,
//!       "watchedDuration": 540.0,
//!       "totalDuration": 600.0,
//!       "lastWatched": "2024-01-01T12:10:00Z"
//!     }
//!   },
//!   "currentLesson": "lesson-1-2",
//!   "completedLessons": 1,
//!   "totalLessons": 12
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::catalog::CourseModule;
use crate::ids::{CourseId, LessonId};

/// Watch progress ratio, clamped to `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct WatchProgress(f64);

impl WatchProgress {
    /// Create a new watch progress, clamping between 0.0 and 1.0
    pub fn new(progress: f64) -> Self {
        if progress.is_nan() {
            return WatchProgress(0.0);
        }
        WatchProgress(progress.clamp(0.0, 1.0))
    }

    /// Ratio of `watched` to `total`, or `None` when the total is unknown
    /// (zero, negative or not finite).
    pub fn from_durations(watched: f64, total: f64) -> Option<Self> {
        if !total.is_finite() || total <= 0.0 || !watched.is_finite() {
            return None;
        }
        Some(WatchProgress::new(watched / total))
    }

    pub fn as_ratio(&self) -> f64 {
        self.0
    }

    /// Check whether the ratio meets a completion threshold
    pub fn reaches(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

/// Display state of a lesson in the learning interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LessonStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl LessonStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, LessonStatus::Completed)
    }
}

/// Partial update merged into a [`LessonProgress`]
///
/// Absent fields keep their previous value. `completed: Some(false)` is
/// accepted but can never clear a lesson that is already complete.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LessonProgressPatch {
    pub completed: Option<bool>,
    pub watched_duration: Option<f64>,
    pub total_duration: Option<f64>,
}

impl LessonProgressPatch {
    pub fn watched(seconds: f64) -> Self {
        Self {
            watched_duration: Some(seconds),
            ..Self::default()
        }
    }

    pub fn completed() -> Self {
        Self {
            completed: Some(true),
            ..Self::default()
        }
    }

    pub fn with_total(mut self, seconds: f64) -> Self {
        self.total_duration = Some(seconds);
        self
    }

    pub fn with_watched(mut self, seconds: f64) -> Self {
        self.watched_duration = Some(seconds);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_none()
            && self.watched_duration.is_none()
            && self.total_duration.is_none()
    }
}

/// Durations must be finite and non-negative to be recorded.
fn sanitize_seconds(value: Option<f64>) -> Option<f64> {
    value.filter(|secs| secs.is_finite() && *secs >= 0.0)
}

/// Progress of one lesson for the current learner
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LessonProgress {
    pub lesson_id: LessonId,
    pub completed: bool,
    /// Elapsed playback position in seconds
    pub watched_duration: f64,
    /// Media length in seconds, `0.0` until metadata has loaded
    pub total_duration: f64,
    pub last_watched: DateTime<Utc>,
}

impl LessonProgress {
    /// Zeroed record used when a lesson reports progress for the first time.
    pub fn new(lesson_id: LessonId, now: DateTime<Utc>) -> Self {
        Self {
            lesson_id,
            completed: false,
            watched_duration: 0.0,
            total_duration: 0.0,
            last_watched: now,
        }
    }

    /// Merge `patch` and stamp `last_watched`. Completion only ever moves
    /// from `false` to `true`.
    pub fn merge(&mut self, patch: &LessonProgressPatch, now: DateTime<Utc>) {
        if patch.completed == Some(true) {
            self.completed = true;
        }
        if let Some(watched) = sanitize_seconds(patch.watched_duration) {
            self.watched_duration = watched;
        }
        if let Some(total) = sanitize_seconds(patch.total_duration) {
            self.total_duration = total;
        }
        self.last_watched = now;
    }

    pub fn watch_progress(&self) -> Option<WatchProgress> {
        WatchProgress::from_durations(
            self.watched_duration,
            self.total_duration,
        )
    }

    pub fn status(&self) -> LessonStatus {
        if self.completed {
            LessonStatus::Completed
        } else if self.watched_duration > 0.0 {
            LessonStatus::InProgress
        } else {
            LessonStatus::NotStarted
        }
    }
}

/// Enrollment record and per-lesson progress for one course
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CourseProgress {
    course_id: CourseId,
    enrolled_at: DateTime<Utc>,
    lessons: BTreeMap<LessonId, LessonProgress>,
    #[cfg_attr(
        feature = "serde",
        serde(skip_serializing_if = "Option::is_none")
    )]
    current_lesson: Option<LessonId>,
    completed_lessons: u32,
    total_lessons: u32,
}

impl CourseProgress {
    pub fn new(
        course_id: CourseId,
        total_lessons: u32,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            course_id,
            enrolled_at,
            lessons: BTreeMap::new(),
            current_lesson: None,
            completed_lessons: 0,
            total_lessons,
        }
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    pub fn lessons(&self) -> &BTreeMap<LessonId, LessonProgress> {
        &self.lessons
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&LessonProgress> {
        self.lessons.get(lesson_id)
    }

    /// Resume pointer: the last lesson the learner navigated to.
    pub fn current_lesson(&self) -> Option<&LessonId> {
        self.current_lesson.as_ref()
    }

    pub fn set_current_lesson(&mut self, lesson_id: LessonId) {
        self.current_lesson = Some(lesson_id);
    }

    pub fn completed_lessons(&self) -> u32 {
        self.completed_lessons
    }

    pub fn total_lessons(&self) -> u32 {
        self.total_lessons
    }

    /// Apply a patch to one lesson, creating the record lazily, then
    /// recompute the completed count.
    pub fn apply_lesson_patch(
        &mut self,
        lesson_id: &LessonId,
        patch: &LessonProgressPatch,
        now: DateTime<Utc>,
    ) -> &LessonProgress {
        self.lessons
            .entry(lesson_id.clone())
            .or_insert_with(|| LessonProgress::new(lesson_id.clone(), now))
            .merge(patch, now);
        self.completed_lessons = count_completed(&self.lessons);

        &self.lessons[lesson_id]
    }

    pub fn lesson_status(&self, lesson_id: &str) -> LessonStatus {
        self.lessons
            .get(lesson_id)
            .map(LessonProgress::status)
            .unwrap_or(LessonStatus::NotStarted)
    }

    /// Completed over total lessons; `0.0` when the course has no lessons.
    pub fn completion_ratio(&self) -> f64 {
        if self.total_lessons == 0 {
            return 0.0;
        }
        f64::from(self.completed_lessons) / f64::from(self.total_lessons)
    }

    /// Share of a module's lessons that are complete; `0.0` for an empty
    /// module.
    pub fn module_completion_ratio(&self, module: &CourseModule) -> f64 {
        if module.lessons.is_empty() {
            return 0.0;
        }
        let completed = module
            .lessons
            .iter()
            .filter(|lesson| {
                self.lesson_status(lesson.id.as_str()).is_completed()
            })
            .count();
        completed as f64 / module.lessons.len() as f64
    }
}

/// The only way `completed_lessons` is ever produced.
fn count_completed(lessons: &BTreeMap<LessonId, LessonProgress>) -> u32 {
    let completed = lessons.values().filter(|lesson| lesson.completed).count();
    u32::try_from(completed).unwrap_or(u32::MAX)
}

// Stored counts are never trusted; recompute from the lesson map.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CourseProgress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CourseProgressHelper {
            course_id: CourseId,
            enrolled_at: DateTime<Utc>,
            #[serde(default)]
            lessons: BTreeMap<LessonId, LessonProgress>,
            #[serde(default)]
            current_lesson: Option<LessonId>,
            #[serde(default)]
            total_lessons: u32,
        }

        let helper = CourseProgressHelper::deserialize(deserializer)?;
        let completed_lessons = count_completed(&helper.lessons);

        Ok(CourseProgress {
            course_id: helper.course_id,
            enrolled_at: helper.enrolled_at,
            lessons: helper.lessons,
            current_lesson: helper.current_lesson,
            completed_lessons,
            total_lessons: helper.total_lessons,
        })
    }
}
