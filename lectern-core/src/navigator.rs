//! Course navigation
//!
//! Resolves the active lesson when a learner enters a course and moves
//! through the curriculum one lesson at a time. Every successful selection
//! also moves the enrollment store's resume pointer, so the two never
//! disagree.

use lectern_model::{Course, CourseLesson, CourseModule, LessonPosition};
use tracing::debug;

use crate::enrollment::EnrollmentStore;
use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::time::Clock;

/// Cursor over one course's curriculum
#[derive(Debug, Clone)]
pub struct CourseNavigator<'c> {
    course: &'c Course,
    position: Option<LessonPosition>,
}

impl<'c> CourseNavigator<'c> {
    /// Resolve the initial lesson: the stored resume pointer if it names a
    /// lesson in this curriculum, else the first lesson of the course.
    /// Entering does not write the pointer.
    pub fn enter<S: KeyValueStore, C: Clock>(
        course: &'c Course,
        store: &EnrollmentStore<S, C>,
    ) -> Self {
        let resumed = store
            .get_course_progress(course.id.as_str())
            .and_then(|progress| progress.current_lesson())
            .and_then(|lesson_id| course.find_lesson(lesson_id.as_str()));

        let position = resumed.or_else(|| course.first_lesson());
        debug!(
            course_id = %course.id,
            resumed = resumed.is_some(),
            ?position,
            "entered course"
        );

        Self { course, position }
    }

    pub fn course(&self) -> &'c Course {
        self.course
    }

    pub fn position(&self) -> Option<LessonPosition> {
        self.position
    }

    pub fn current_lesson(&self) -> Option<&'c CourseLesson> {
        self.course.lesson_at(self.position?)
    }

    pub fn current_module(&self) -> Option<&'c CourseModule> {
        self.course.module_at(self.position?)
    }

    pub fn has_next(&self) -> bool {
        self.next_position().is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_position().is_some()
    }

    /// Select a lesson by id (first match in curriculum order). Returns
    /// `false` and changes nothing when the id is not in the curriculum.
    pub fn select<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
        lesson_id: &str,
    ) -> Result<bool> {
        match self.course.find_lesson(lesson_id) {
            Some(position) => self.go_to(store, position).map(|_| true),
            None => {
                debug!(
                    course_id = %self.course.id,
                    lesson_id,
                    "lesson not in curriculum"
                );
                Ok(false)
            }
        }
    }

    /// Advance to the following lesson, crossing into the next non-empty
    /// module when needed. At the last lesson this is a no-op returning
    /// `false`.
    pub fn next<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
    ) -> Result<bool> {
        match self.next_position() {
            Some(position) => self.go_to(store, position).map(|_| true),
            None => Ok(false),
        }
    }

    /// Step back to the preceding lesson, crossing into the previous
    /// non-empty module when needed. At the first lesson this is a no-op
    /// returning `false`.
    pub fn previous<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
    ) -> Result<bool> {
        match self.previous_position() {
            Some(position) => self.go_to(store, position).map(|_| true),
            None => Ok(false),
        }
    }

    fn go_to<S: KeyValueStore, C: Clock>(
        &mut self,
        store: &mut EnrollmentStore<S, C>,
        position: LessonPosition,
    ) -> Result<()> {
        let Some(lesson) = self.course.lesson_at(position) else {
            return Ok(());
        };
        self.position = Some(position);
        store.set_current_lesson(&self.course.id, &lesson.id)?;
        Ok(())
    }

    fn next_position(&self) -> Option<LessonPosition> {
        let current = self.position?;
        let module = self.course.curriculum.get(current.module)?;
        if current.lesson + 1 < module.lessons.len() {
            return Some(LessonPosition::new(
                current.module,
                current.lesson + 1,
            ));
        }

        self.course
            .curriculum
            .iter()
            .enumerate()
            .skip(current.module + 1)
            .find(|(_, module)| !module.lessons.is_empty())
            .map(|(idx, _)| LessonPosition::new(idx, 0))
    }

    fn previous_position(&self) -> Option<LessonPosition> {
        let current = self.position?;
        if current.lesson > 0 {
            return Some(LessonPosition::new(
                current.module,
                current.lesson - 1,
            ));
        }

        self.course
            .curriculum
            .get(..current.module)?
            .iter()
            .enumerate()
            .rev()
            .find(|(_, module)| !module.lessons.is_empty())
            .map(|(idx, module)| {
                LessonPosition::new(idx, module.lessons.len() - 1)
            })
    }
}
