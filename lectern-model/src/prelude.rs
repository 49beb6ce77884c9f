//! Snapshot of the types surface for presentation layers.
//! Prefer importing from this module instead of individual tree nodes when
//! rendering catalog or learning views.

pub use super::catalog::{
    Course, CourseCategory, CourseLanguage, CourseLesson, CourseLevel,
    CourseModule, LessonPosition,
};
pub use super::ids::{CourseId, LessonId, ModuleId};
pub use super::progress::{
    CourseProgress, LessonProgress, LessonProgressPatch, LessonStatus,
    WatchProgress,
};
