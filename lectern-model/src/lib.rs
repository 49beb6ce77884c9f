//! Core data model definitions shared across Lectern crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod catalog;
pub mod error;
pub mod ids;
pub mod prelude;
pub mod progress;

// Intentionally curated re-exports for downstream consumers.
pub use catalog::{
    Course, CourseCategory, CourseLanguage, CourseLesson, CourseLevel,
    CourseModule, LessonPosition,
};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{CourseId, LessonId, ModuleId};
pub use progress::{
    CourseProgress, LessonProgress, LessonProgressPatch, LessonStatus,
    WatchProgress,
};
