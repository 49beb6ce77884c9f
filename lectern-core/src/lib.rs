//! # Lectern Core
//!
//! Enrollment and lesson-progress tracking for a course catalog.
//!
//! ## Overview
//!
//! - **Catalog**: read-only courses seeded from static JSON ([`catalog`])
//! - **Enrollment store**: the learner's enrollments and per-lesson progress,
//!   persisted as one key-value blob ([`enrollment`], [`storage`])
//! - **Lesson player adapter**: turns playback signals into throttled progress
//!   writes and one-shot completion events ([`player`], [`throttle`])
//! - **Navigator**: initial lesson resolution and next/previous sequencing
//!   that keeps the resume pointer current ([`navigator`])
//!
//! Time is read through [`time::Clock`] so throttling and timestamps can be
//! driven by a virtual clock in tests.
//!
//! ## Example
//!
//! ```
//! use lectern_core::{
//!     CourseCatalog, CourseNavigator, EnrollmentStore, LessonPlayer,
//!     MemoryStore, SystemClock, TrackerSettings,
//! };
//!
//! let catalog = CourseCatalog::from_json_str(r#"[{
//!     "id": "peds-1",
//!     "title": "Pediatric Triage",
//!     "description": "Triage basics.",
//!     "instructor": "Dr. Adeyemi",
//!     "level": "Beginner",
//!     "category": "Pediatrics",
//!     "language": "English"
//! }]"#).unwrap();
//! let course = catalog.get("peds-1").unwrap();
//!
//! let settings = TrackerSettings::default();
//! let mut store =
//!     EnrollmentStore::load(MemoryStore::new(), SystemClock, &settings);
//! store.enroll(&course.id, course.total_lectures).unwrap();
//!
//! let mut navigator = CourseNavigator::enter(course, &store);
//! let lesson = navigator.current_lesson().unwrap();
//!
//! let mut player = LessonPlayer::open(
//!     &store,
//!     course.id.clone(),
//!     lesson.id.clone(),
//!     &settings,
//! );
//! let resume = player.resume_position();
//! player.on_metadata_loaded(&mut store, 1800.0, resume).unwrap();
//! player.on_ended(&mut store).unwrap();
//!
//! assert!(navigator.next(&mut store).unwrap());
//! let progress = store.get_course_progress("peds-1").unwrap();
//! assert_eq!(progress.completed_lessons(), 1);
//! ```

#![allow(missing_docs)]

pub mod catalog;
pub mod enrollment;
pub mod error;
pub mod navigator;
pub mod player;
pub mod settings;
pub mod storage;
pub mod throttle;
pub mod time;

pub use catalog::CourseCatalog;
pub use enrollment::{EnrollmentMap, EnrollmentStore};
pub use error::{CatalogError, Result, TrackerError};
pub use navigator::CourseNavigator;
pub use player::{LessonPlayer, PlayerEvent};
pub use settings::TrackerSettings;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use throttle::ProgressThrottle;
pub use time::{Clock, SystemClock, VirtualClock};

pub use lectern_model as model;
