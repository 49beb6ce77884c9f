//! Lesson player adapter
//!
//! Bridges media playback signals (metadata loaded, time update, end of
//! stream) into enrollment store updates. The adapter never owns the store;
//! every signal handler borrows it for the duration of the call.
//!
//! ## Completion
//!
//! A lesson completes the first time either
//! - the watched ratio reaches the configured threshold (90% by default), or
//! - the media reports a natural end of stream.
//!
//! The percentage rule needs a known, positive total duration; without one
//! only end of stream completes the lesson. Completion is latched: the
//! optional continuation fires once on the false to true transition and
//! never again for this player. A failed write does not hold the transition
//! back; the store keeps the completion in memory and the failure is logged.

use std::fmt;

use lectern_model::{CourseId, LessonId, LessonProgressPatch, WatchProgress};
use tracing::{debug, info, warn};

use crate::enrollment::EnrollmentStore;
use crate::error::Result;
use crate::settings::TrackerSettings;
use crate::storage::KeyValueStore;
use crate::throttle::ProgressThrottle;
use crate::time::Clock;

type CompletionCallback = Box<dyn FnMut(&LessonId)>;

/// Outcome of a playback signal that the caller may want to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The lesson just crossed into completed
    Completed { lesson_id: LessonId },
}

fn known_seconds(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub struct LessonPlayer {
    course_id: CourseId,
    lesson_id: LessonId,
    completion_ratio: f64,
    resume_position: f64,
    position: f64,
    total_duration: Option<f64>,
    completed: bool,
    throttle: ProgressThrottle<f64>,
    on_complete: Option<CompletionCallback>,
}

impl fmt::Debug for LessonPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LessonPlayer")
            .field("course_id", &self.course_id)
            .field("lesson_id", &self.lesson_id)
            .field("position", &self.position)
            .field("total_duration", &self.total_duration)
            .field("completed", &self.completed)
            .field(
                "on_complete",
                &self.on_complete.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl LessonPlayer {
    /// Bind a player to one lesson, picking up any prior progress as the
    /// resume offset.
    pub fn open<S: KeyValueStore, C: Clock>(
        store: &EnrollmentStore<S, C>,
        course_id: CourseId,
        lesson_id: LessonId,
        settings: &TrackerSettings,
    ) -> Self {
        let settings = settings.clone().sanitized();
        let prior = store
            .get_lesson_progress(course_id.as_str(), lesson_id.as_str());
        let resume_position =
            prior.map(|p| p.watched_duration).unwrap_or(0.0);
        let completed = prior.is_some_and(|p| p.completed);
        let total_duration = prior
            .map(|p| p.total_duration)
            .filter(|total| *total > 0.0);

        debug!(
            %course_id,
            %lesson_id,
            resume_position,
            completed,
            "opened lesson player"
        );

        Self {
            course_id,
            lesson_id,
            completion_ratio: settings.completion_ratio,
            resume_position,
            position: resume_position,
            total_duration,
            completed,
            throttle: ProgressThrottle::new(settings.flush_interval()),
            on_complete: None,
        }
    }

    /// Register the continuation run when the lesson completes, e.g. to
    /// advance to the next lesson.
    pub fn with_on_complete(
        mut self,
        callback: impl FnMut(&LessonId) + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    /// Offset the media surface should seek to before playback starts.
    pub fn resume_position(&self) -> f64 {
        self.resume_position
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn total_duration(&self) -> Option<f64> {
        self.total_duration
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn has_pending_write(&self) -> bool {
        self.throttle.has_pending()
    }

    /// Watched fraction of the lesson, if the total duration is known.
    pub fn watch_progress(&self) -> Option<WatchProgress> {
        WatchProgress::from_durations(self.position, self.total_duration?)
    }

    /// Media metadata arrived. `position` is where playback currently sits,
    /// normally the resume offset after seeking.
    pub fn on_metadata_loaded<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
        total_duration: f64,
        position: f64,
    ) -> Result<Option<PlayerEvent>> {
        self.total_duration =
            known_seconds(total_duration).filter(|total| *total > 0.0);
        if let Some(position) = known_seconds(position) {
            self.position = position;
        }

        let mut patch = LessonProgressPatch::watched(self.position);
        if let Some(total) = self.total_duration {
            patch = patch.with_total(total);
        }
        // Anything waiting in the throttle is older than this write.
        self.throttle.take_now(store.clock().now());
        store.update_lesson_progress(&self.course_id, &self.lesson_id, patch)?;
        self.throttle.mark_flushed(store.clock().now());

        self.check_threshold(store)
    }

    /// Periodic playback position report. A failed throttled write is
    /// logged and does not stop the completion check.
    pub fn on_time_update<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
        position: f64,
    ) -> Result<Option<PlayerEvent>> {
        let Some(position) = known_seconds(position) else {
            return Ok(None);
        };
        self.position = position;
        self.throttle.record(position);
        if let Err(err) = self.poll(store) {
            warn!(
                course_id = %self.course_id,
                lesson_id = %self.lesson_id,
                position,
                error = %err,
                "failed to write playback position"
            );
        }

        self.check_threshold(store)
    }

    /// Natural end of the media stream.
    pub fn on_ended<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
    ) -> Result<Option<PlayerEvent>> {
        if let Some(total) = self.total_duration {
            self.position = self.position.max(total);
        }
        Ok(self.complete(store))
    }

    /// Write the pending position if the throttle window has elapsed.
    /// Returns whether a write happened.
    pub fn poll<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
    ) -> Result<bool> {
        match self.throttle.take_due(store.clock().now()) {
            Some(position) => {
                self.write_position(store, position).map(|_| true)
            }
            None => Ok(false),
        }
    }

    /// Write the pending position immediately.
    pub fn flush<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
    ) -> Result<bool> {
        match self.throttle.take_now(store.clock().now()) {
            Some(position) => {
                self.write_position(store, position).map(|_| true)
            }
            None => Ok(false),
        }
    }

    /// Detach from the media surface, flushing any pending position.
    pub fn close<S: KeyValueStore, C: Clock>(
        mut self,
        store: &mut EnrollmentStore<S, C>,
    ) -> Result<()> {
        self.flush(store)?;
        debug!(
            course_id = %self.course_id,
            lesson_id = %self.lesson_id,
            "closed lesson player"
        );
        Ok(())
    }

    fn write_position<S: KeyValueStore, C: Clock>(
        &self,
        store: &mut EnrollmentStore<S, C>,
        position: f64,
    ) -> Result<()> {
        store.update_lesson_progress(
            &self.course_id,
            &self.lesson_id,
            LessonProgressPatch::watched(position),
        )?;
        Ok(())
    }

    fn check_threshold<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
    ) -> Result<Option<PlayerEvent>> {
        let reached = self
            .watch_progress()
            .is_some_and(|progress| progress.reaches(self.completion_ratio));
        if reached {
            Ok(self.complete(store))
        } else {
            Ok(None)
        }
    }

    fn complete<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
    ) -> Option<PlayerEvent> {
        if self.completed {
            return None;
        }

        self.throttle.take_now(store.clock().now());
        let written = store.update_lesson_progress(
            &self.course_id,
            &self.lesson_id,
            LessonProgressPatch::completed().with_watched(self.position),
        );
        if let Err(err) = written {
            warn!(
                course_id = %self.course_id,
                lesson_id = %self.lesson_id,
                error = %err,
                "lesson completion not persisted"
            );
        }

        self.completed = true;
        info!(
            course_id = %self.course_id,
            lesson_id = %self.lesson_id,
            position = self.position,
            "lesson finished"
        );

        if let Some(callback) = self.on_complete.as_mut() {
            callback(&self.lesson_id);
        }

        Some(PlayerEvent::Completed {
            lesson_id: self.lesson_id.clone(),
        })
    }
}
