//! Enrollment store and lesson progress tracking
//!
//! [`EnrollmentStore`] is the single owner of every [`CourseProgress`] for
//! the current learner profile. It is an ordinary value: construct it once,
//! then pass it by reference to the player adapter and navigator.
//!
//! ## Invariants
//!
//! - **Idempotent enrollment**: enrolling in a course that already has a
//!   record changes nothing.
//! - **No orphan progress**: lesson updates and resume-pointer writes for a
//!   course without an enrollment record are ignored.
//! - **Derived count**: `completed_lessons` is recomputed from the lesson
//!   map on every lesson update (see [`CourseProgress::apply_lesson_patch`]).
//! - **Durability**: every state change rewrites the whole map under one
//!   storage key. Loading treats a missing or unreadable blob as "no
//!   enrollments".
//!
//! ## Example
//!
//! ```
//! use lectern_core::{
//!     EnrollmentStore, MemoryStore, SystemClock, TrackerSettings,
//! };
//! use lectern_model::{CourseId, LessonId, LessonProgressPatch};
//!
//! let settings = TrackerSettings::default();
//! let mut store =
//!     EnrollmentStore::load(MemoryStore::new(), SystemClock, &settings);
//! let course = CourseId::from("cardio-101");
//! let lesson = LessonId::from("lesson-1-1");
//!
//! store.enroll(&course, 12).unwrap();
//! let patch = LessonProgressPatch::watched(540.0).with_total(600.0);
//! store.update_lesson_progress(&course, &lesson, patch).unwrap();
//! store.mark_lesson_complete(&course, &lesson).unwrap();
//!
//! let progress = store.get_course_progress("cardio-101").unwrap();
//! assert_eq!(progress.completed_lessons(), 1);
//! ```

use std::collections::BTreeMap;

use lectern_model::{
    CourseId, CourseModule, CourseProgress, LessonId, LessonProgress,
    LessonProgressPatch, LessonStatus,
};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::settings::TrackerSettings;
use crate::storage::KeyValueStore;
use crate::time::{Clock, SystemClock};

/// Every enrollment of one learner profile, keyed by course
pub type EnrollmentMap = BTreeMap<CourseId, CourseProgress>;

#[derive(Debug)]
pub struct EnrollmentStore<S, C = SystemClock> {
    courses: EnrollmentMap,
    storage: S,
    clock: C,
    storage_key: String,
}

impl<S: KeyValueStore, C: Clock> EnrollmentStore<S, C> {
    /// Read the persisted map once. Absent, unreadable or malformed data
    /// yields an empty store. A blank storage key falls back to the default.
    pub fn load(storage: S, clock: C, settings: &TrackerSettings) -> Self {
        let storage_key = settings.clone().sanitized().storage_key;
        let courses = match storage.get(&storage_key) {
            Ok(Some(raw)) => decode_enrollments(&raw).unwrap_or_else(|err| {
                warn!(
                    key = %storage_key,
                    error = %err,
                    "discarding malformed enrollment data"
                );
                EnrollmentMap::new()
            }),
            Ok(None) => EnrollmentMap::new(),
            Err(err) => {
                warn!(
                    key = %storage_key,
                    error = %err,
                    "failed to read enrollment data"
                );
                EnrollmentMap::new()
            }
        };
        debug!(courses = courses.len(), "loaded enrollment store");

        Self {
            courses,
            storage,
            clock,
            storage_key,
        }
    }

    /// Enroll in `course_id`. Returns `false` without touching the existing
    /// record when already enrolled.
    pub fn enroll(
        &mut self,
        course_id: &CourseId,
        total_lessons: u32,
    ) -> Result<bool> {
        if self.courses.contains_key(course_id) {
            debug!(%course_id, "already enrolled, keeping existing progress");
            return Ok(false);
        }

        let progress = CourseProgress::new(
            course_id.clone(),
            total_lessons,
            self.clock.utc_now(),
        );
        self.courses.insert(course_id.clone(), progress);
        info!(%course_id, total_lessons, "enrolled in course");
        self.persist()?;
        Ok(true)
    }

    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.courses.contains_key(course_id)
    }

    /// Merge `patch` into the lesson's progress, stamping `last_watched`.
    ///
    /// Returns the updated record, or `None` when the course has no
    /// enrollment (nothing is created or persisted in that case).
    pub fn update_lesson_progress(
        &mut self,
        course_id: &CourseId,
        lesson_id: &LessonId,
        patch: LessonProgressPatch,
    ) -> Result<Option<LessonProgress>> {
        let now = self.clock.utc_now();
        let Some(course) = self.courses.get_mut(course_id) else {
            debug!(
                %course_id,
                %lesson_id,
                "ignoring progress for course without enrollment"
            );
            return Ok(None);
        };

        let was_completed = course
            .lesson(lesson_id.as_str())
            .is_some_and(|lesson| lesson.completed);
        let updated = course.apply_lesson_patch(lesson_id, &patch, now).clone();
        if updated.completed && !was_completed {
            info!(
                %course_id,
                %lesson_id,
                completed_lessons = course.completed_lessons(),
                total_lessons = course.total_lessons(),
                "lesson completed"
            );
        }

        self.persist()?;
        Ok(Some(updated))
    }

    pub fn get_lesson_progress(
        &self,
        course_id: &str,
        lesson_id: &str,
    ) -> Option<&LessonProgress> {
        self.courses.get(course_id)?.lesson(lesson_id)
    }

    pub fn get_course_progress(
        &self,
        course_id: &str,
    ) -> Option<&CourseProgress> {
        self.courses.get(course_id)
    }

    /// Complete a lesson through the regular merge path.
    pub fn mark_lesson_complete(
        &mut self,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<Option<LessonProgress>> {
        self.update_lesson_progress(
            course_id,
            lesson_id,
            LessonProgressPatch::completed(),
        )
    }

    /// Move the resume pointer. Returns `false` for a course without
    /// enrollment.
    pub fn set_current_lesson(
        &mut self,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<bool> {
        let Some(course) = self.courses.get_mut(course_id) else {
            debug!(
                %course_id,
                %lesson_id,
                "ignoring resume pointer for course without enrollment"
            );
            return Ok(false);
        };
        course.set_current_lesson(lesson_id.clone());
        self.persist()?;
        Ok(true)
    }

    pub fn lesson_status(
        &self,
        course_id: &str,
        lesson_id: &str,
    ) -> LessonStatus {
        self.courses
            .get(course_id)
            .map(|course| course.lesson_status(lesson_id))
            .unwrap_or(LessonStatus::NotStarted)
    }

    /// Completed share of the course, `0.0` when not enrolled.
    pub fn course_completion_ratio(&self, course_id: &str) -> f64 {
        self.courses
            .get(course_id)
            .map(CourseProgress::completion_ratio)
            .unwrap_or(0.0)
    }

    pub fn module_completion_ratio(
        &self,
        course_id: &str,
        module: &CourseModule,
    ) -> f64 {
        self.courses
            .get(course_id)
            .map(|course| course.module_completion_ratio(module))
            .unwrap_or(0.0)
    }

    pub fn enrolled_course_ids(&self) -> impl Iterator<Item = &CourseId> {
        self.courses.keys()
    }

    pub fn enrollments(&self) -> &EnrollmentMap {
        &self.courses
    }

    /// Owned copy of the whole map, for before/after comparisons.
    pub fn snapshot(&self) -> EnrollmentMap {
        self.courses.clone()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn persist(&mut self) -> Result<()> {
        let encoded = encode_enrollments(&self.courses)?;
        if let Err(err) = self.storage.set(&self.storage_key, &encoded) {
            warn!(
                key = %self.storage_key,
                error = %err,
                "failed to persist enrollment data"
            );
            return Err(err);
        }
        Ok(())
    }
}

/// Serialize the map in its persisted JSON form.
pub fn encode_enrollments(courses: &EnrollmentMap) -> Result<String> {
    Ok(serde_json::to_string(courses)?)
}

/// Parse the persisted JSON form. Completed counts are recomputed from the
/// lesson maps rather than read back.
pub fn decode_enrollments(raw: &str) -> Result<EnrollmentMap> {
    Ok(serde_json::from_str(raw)?)
}
