//! Course entity, the inverse side of the enrollment association.

use super::{ensure_not_blank, ensure_positive_id, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type CourseId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub professor: String,
}

impl Course {
    /// Builds a validated course.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        professor: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        let course = Self {
            id,
            title: title.into(),
            professor: professor.into(),
        };
        course.validate()?;
        Ok(course)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_positive_id(self.id)?;
        ensure_not_blank("title", &self.title)?;
        ensure_not_blank("professor", &self.professor)
    }
}

impl Display for Course {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{id={}, title='{}', professor='{}'}}",
            self.id, self.title, self.professor
        )
    }
}
