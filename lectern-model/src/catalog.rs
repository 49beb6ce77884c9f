//! Course catalog records.
//!
//! A [`Course`] owns an ordered curriculum of [`CourseModule`]s, each owning
//! an ordered list of [`CourseLesson`]s. Ordering is significant: it defines
//! how learners move through the course.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ModelError;
use crate::ids::{CourseId, LessonId, ModuleId};

macro_rules! display_enum {
    (
        $name:ident,
        $kind:literal,
        { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        impl $name {
            /// Every variant in catalog display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(ModelError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Difficulty of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

display_enum!(CourseLevel, "course level", {
    Beginner => "Beginner",
    Intermediate => "Intermediate",
    Advanced => "Advanced",
});

/// Medical specialty a course belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CourseCategory {
    Surgery,
    Pediatrics,
    Cardiology,
    Neurology,
    Radiology,
    #[cfg_attr(feature = "serde", serde(rename = "Emergency Medicine"))]
    EmergencyMedicine,
    #[cfg_attr(feature = "serde", serde(rename = "Internal Medicine"))]
    InternalMedicine,
    Orthopedics,
}

display_enum!(CourseCategory, "course category", {
    Surgery => "Surgery",
    Pediatrics => "Pediatrics",
    Cardiology => "Cardiology",
    Neurology => "Neurology",
    Radiology => "Radiology",
    EmergencyMedicine => "Emergency Medicine",
    InternalMedicine => "Internal Medicine",
    Orthopedics => "Orthopedics",
});

/// Language a course is taught in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CourseLanguage {
    Bulgarian,
    English,
    French,
    German,
    Hindi,
    Hungarian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
}

display_enum!(CourseLanguage, "course language", {
    Bulgarian => "Bulgarian",
    English => "English",
    French => "French",
    German => "German",
    Hindi => "Hindi",
    Hungarian => "Hungarian",
    Portuguese => "Portuguese",
    Romanian => "Romanian",
    Russian => "Russian",
    Spanish => "Spanish",
});

/// Smallest playable unit of a course
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CourseLesson {
    pub id: LessonId,
    pub title: String,
    /// Display duration such as `"30 min"`; playback length is learned from
    /// the media itself.
    pub duration: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_preview: bool,
    /// Media locator. Placeholder curricula ship without one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub video_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
}

/// Ordered group of lessons
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CourseModule {
    pub id: ModuleId,
    pub title: String,
    pub lessons: Vec<CourseLesson>,
}

impl CourseModule {
    pub fn lesson_index(&self, lesson_id: &str) -> Option<usize> {
        self.lessons.iter().position(|lesson| lesson.id == lesson_id)
    }
}

/// Index of a lesson inside a course curriculum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LessonPosition {
    pub module: usize,
    pub lesson: usize,
}

impl LessonPosition {
    pub const fn new(module: usize, lesson: usize) -> Self {
        Self { module, lesson }
    }
}

/// Top-level purchasable unit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub full_description: String,
    pub instructor: String,
    pub instructor_title: String,
    pub instructor_bio: String,
    pub instructor_image: String,
    pub price: f64,
    pub duration: String,
    pub level: CourseLevel,
    pub category: CourseCategory,
    pub language: CourseLanguage,
    pub rating: f32,
    pub students_enrolled: u32,
    pub image: String,
    pub features: Vec<String>,
    pub intro_video: String,
    pub curriculum: Vec<CourseModule>,
    pub tags: Vec<String>,
    /// Advertised lecture count. Enrollment records this as the course
    /// total, independent of how many lessons the curriculum lists.
    pub total_lectures: u32,
    pub certificate_available: bool,
}

impl Course {
    /// Number of lessons actually present in the curriculum.
    pub fn lesson_count(&self) -> usize {
        self.curriculum.iter().map(|module| module.lessons.len()).sum()
    }

    /// Locate a lesson by id, scanning modules then lessons in curriculum
    /// order. The first match wins when ids collide across modules.
    pub fn find_lesson(&self, lesson_id: &str) -> Option<LessonPosition> {
        self.curriculum
            .iter()
            .enumerate()
            .find_map(|(module_idx, module)| {
                module.lesson_index(lesson_id).map(|lesson_idx| {
                    LessonPosition::new(module_idx, lesson_idx)
                })
            })
    }

    /// First lesson of the first module that has any lessons.
    pub fn first_lesson(&self) -> Option<LessonPosition> {
        self.curriculum
            .iter()
            .position(|module| !module.lessons.is_empty())
            .map(|module_idx| LessonPosition::new(module_idx, 0))
    }

    pub fn module_at(&self, position: LessonPosition) -> Option<&CourseModule> {
        self.curriculum.get(position.module)
    }

    pub fn lesson_at(&self, position: LessonPosition) -> Option<&CourseLesson> {
        self.curriculum
            .get(position.module)
            .and_then(|module| module.lessons.get(position.lesson))
    }

    /// Iterate every lesson with its parent module, in curriculum order.
    pub fn lessons(
        &self,
    ) -> impl Iterator<Item = (&CourseModule, &CourseLesson)> {
        self.curriculum.iter().flat_map(|module| {
            module.lessons.iter().map(move |lesson| (module, lesson))
        })
    }
}
