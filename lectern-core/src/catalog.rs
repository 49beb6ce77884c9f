//! Read-only course catalog seeded from static JSON
//!
//! Catalog files may omit descriptive fields; defaults are filled in on load
//! so every [`Course`] handed to the rest of the tracker is complete. A
//! course without a curriculum receives a two-lesson placeholder module.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lectern_model::{
    Course, CourseCategory, CourseId, CourseLanguage, CourseLesson,
    CourseLevel, CourseModule, LessonId, ModuleId,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::CatalogError;

const FULL_DESCRIPTION_SUFFIX: &str = concat!(
    " This course provides comprehensive training with hands-on experience",
    " and expert instruction to help you master the essential concepts and",
    " practical skills needed in this field."
);
const DEFAULT_INSTRUCTOR_IMAGE: &str = concat!(
    "https://images.pexels.com/photos/5452201/pexels-photo-5452201.jpeg",
    "?auto=compress&cs=tinysrgb&w=400"
);
const DEFAULT_INTRO_VIDEO: &str = "https://www.youtube.com/embed/dQw4w9WgXcQ";
const DEFAULT_TOTAL_LECTURES: u32 = 12;

/// Course record as it appears in catalog files
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCourse {
    id: CourseId,
    title: String,
    description: String,
    #[serde(default)]
    full_description: Option<String>,
    instructor: String,
    #[serde(default)]
    instructor_title: String,
    #[serde(default)]
    instructor_bio: Option<String>,
    #[serde(default)]
    instructor_image: Option<String>,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    duration: String,
    level: CourseLevel,
    category: CourseCategory,
    language: CourseLanguage,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    students_enrolled: u32,
    #[serde(default)]
    image: String,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    intro_video: Option<String>,
    #[serde(default)]
    curriculum: Option<Vec<CourseModule>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    total_lectures: Option<u32>,
    #[serde(default)]
    certificate_available: Option<bool>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn placeholder_curriculum() -> Vec<CourseModule> {
    let lesson = |id: &str, title: &str, duration: &str, is_preview: bool| {
        CourseLesson {
            id: LessonId::from(id),
            title: title.to_string(),
            duration: duration.to_string(),
            is_preview,
            video_url: None,
            description: None,
        }
    };

    vec![CourseModule {
        id: ModuleId::from("module-1"),
        title: "Introduction and Fundamentals".to_string(),
        lessons: vec![
            lesson("lesson-1-1", "Course Overview", "30 min", true),
            lesson("lesson-1-2", "Basic Concepts", "45 min", false),
        ],
    }]
}

impl RawCourse {
    fn into_course(self) -> Course {
        let full_description =
            non_empty(self.full_description).unwrap_or_else(|| {
                format!("{}{FULL_DESCRIPTION_SUFFIX}", self.description)
            });
        let instructor_bio =
            non_empty(self.instructor_bio).unwrap_or_else(|| {
                format!(
                    "{} is an experienced medical professional with \
                     extensive expertise in {}. With years of clinical \
                     practice and teaching experience, they bring \
                     real-world insights to help students understand \
                     complex medical concepts.",
                    self.instructor,
                    self.category.as_str().to_lowercase()
                )
            });
        let tags = self.tags.unwrap_or_else(|| {
            vec![self.category.to_string(), self.level.to_string()]
        });

        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            full_description,
            instructor: self.instructor,
            instructor_title: self.instructor_title,
            instructor_bio,
            instructor_image: non_empty(self.instructor_image)
                .unwrap_or_else(|| DEFAULT_INSTRUCTOR_IMAGE.to_string()),
            price: self.price,
            duration: self.duration,
            level: self.level,
            category: self.category,
            language: self.language,
            rating: self.rating,
            students_enrolled: self.students_enrolled,
            image: self.image,
            features: self.features,
            intro_video: non_empty(self.intro_video)
                .unwrap_or_else(|| DEFAULT_INTRO_VIDEO.to_string()),
            curriculum: self.curriculum.unwrap_or_else(placeholder_curriculum),
            tags,
            total_lectures: self
                .total_lectures
                .filter(|count| *count > 0)
                .unwrap_or(DEFAULT_TOTAL_LECTURES),
            certificate_available: self.certificate_available.unwrap_or(true),
        }
    }
}

/// Immutable list of courses with lookup by id
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: Vec<Course>,
    index: HashMap<CourseId, usize>,
}

impl CourseCatalog {
    /// Build a catalog from already-complete courses. Later duplicates of an
    /// id are dropped.
    pub fn new(courses: impl IntoIterator<Item = Course>) -> Self {
        let mut catalog = Self::default();
        for course in courses {
            if catalog.index.contains_key(&course.id) {
                warn!(
                    course_id = %course.id,
                    "duplicate course id in catalog, keeping first"
                );
                continue;
            }
            catalog.index.insert(course.id.clone(), catalog.courses.len());
            catalog.courses.push(course);
        }
        catalog
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let records: Vec<RawCourse> = serde_json::from_str(raw)?;
        for record in &records {
            CourseId::try_new(record.id.as_str())?;
        }
        let catalog =
            Self::new(records.into_iter().map(RawCourse::into_course));
        debug!(courses = catalog.len(), "loaded course catalog");
        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let contents =
            fs::read_to_string(path).map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&contents)
    }

    pub fn get(&self, course_id: &str) -> Option<&Course> {
        self.index.get(course_id).map(|idx| &self.courses[*idx])
    }

    /// Courses in file order
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPARSE: &str = r#"[
        {
            "id": "cardio-101",
            "title": "ECG Basics",
            "description": "Read a 12-lead ECG.",
            "instructor": "Dr. Rao",
            "instructorTitle": "Cardiologist",
            "price": 49.0,
            "duration": "6 hours",
            "level": "Beginner",
            "category": "Emergency Medicine",
            "language": "English",
            "rating": 4.7,
            "studentsEnrolled": 1200,
            "image": "ecg.png",
            "features": ["Certificate"],
            "totalLectures": 0
        }
    ]"#;

    #[test]
    fn missing_fields_receive_defaults() {
        let catalog = CourseCatalog::from_json_str(SPARSE).unwrap();
        let course = catalog.get("cardio-101").unwrap();

        assert!(
            course
                .full_description
                .starts_with("Read a 12-lead ECG. This course")
        );
        assert!(
            course
                .instructor_bio
                .contains("expertise in emergency medicine.")
        );
        assert_eq!(course.instructor_image, DEFAULT_INSTRUCTOR_IMAGE);
        assert_eq!(course.intro_video, DEFAULT_INTRO_VIDEO);
        assert_eq!(course.tags, vec!["Emergency Medicine", "Beginner"]);
        assert_eq!(course.total_lectures, DEFAULT_TOTAL_LECTURES);
        assert!(course.certificate_available);
        assert_eq!(course.curriculum.len(), 1);
        assert_eq!(course.curriculum[0].lessons[0].id, "lesson-1-1");
        assert!(course.curriculum[0].lessons[0].is_preview);
    }

    #[test]
    fn explicit_empty_curriculum_is_kept() {
        let raw = SPARSE.replace("\"totalLectures\": 0", "\"curriculum\": []");
        let catalog = CourseCatalog::from_json_str(&raw).unwrap();
        assert!(catalog.get("cardio-101").unwrap().curriculum.is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let catalog = CourseCatalog::from_json_str(SPARSE).unwrap();
        let first = catalog.courses()[0].clone();
        let mut second = first.clone();
        second.title = "Shadow".into();

        let catalog = CourseCatalog::new([first, second]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("cardio-101").unwrap().title, "ECG Basics");
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        assert!(matches!(
            CourseCatalog::from_json_str("{not json"),
            Err(CatalogError::Parse(_))
        ));
        let blank_id = SPARSE.replace("cardio-101", " ");
        assert!(matches!(
            CourseCatalog::from_json_str(&blank_id),
            Err(CatalogError::Model(_))
        ));
    }
}
