use std::borrow::Borrow;
use std::fmt;

use crate::error::ModelError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize)
        )]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Builds the id, rejecting empty or whitespace-only input.
            pub fn try_new(id: impl Into<String>) -> Result<Self, ModelError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ModelError::InvalidId(format!(
                        "{} id must not be empty",
                        $kind
                    )));
                }
                Ok(Self(id))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Catalog identifier of a course, e.g. `"cardio-101"`.
    CourseId,
    "course"
);

string_id!(
    /// Identifier of a module within a course curriculum.
    ModuleId,
    "module"
);

string_id!(
    /// Identifier of a lesson. Unique within a course in well-formed
    /// catalogs; lookups take the first match in curriculum order.
    LessonId,
    "lesson"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_blank_ids() {
        assert!(CourseId::try_new("  ").is_err());
        assert_eq!(
            LessonId::try_new("lesson-1-1").unwrap().as_str(),
            "lesson-1-1"
        );
    }

    #[test]
    fn ids_compare_against_str() {
        let id = ModuleId::from("module-1");
        assert_eq!(id, "module-1");
        assert_eq!(id.to_string(), "module-1");
    }
}
