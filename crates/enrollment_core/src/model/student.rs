//! Student entity, the owning side of the enrollment association.
//!
//! # Invariants
//! - `courses` is an ordered bag: `add_course` never deduplicates. Stored
//!   links are unique per (student, course) regardless.

use super::course::{Course, CourseId};
use super::{ensure_not_blank, ensure_positive_id, ModelValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type StudentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    /// Courses in association order; loaded ones come first, sorted by id.
    #[serde(default)]
    pub courses: Vec<Course>,
}

impl Student {
    /// Builds a validated student with no courses.
    pub fn new(
        id: StudentId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, ModelValidationError> {
        let student = Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            courses: Vec::new(),
        };
        student.validate()?;
        Ok(student)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_positive_id(self.id)?;
        ensure_not_blank("first_name", &self.first_name)?;
        ensure_not_blank("last_name", &self.last_name)
    }

    /// Appends `course` to this student's collection.
    ///
    /// Nothing is written until the owning session flushes.
    pub fn add_course(&mut self, course: Course) {
        self.courses.push(course);
    }

    /// Distinct course ids in first-seen order.
    pub fn course_ids(&self) -> Vec<CourseId> {
        let mut ids: Vec<CourseId> = Vec::with_capacity(self.courses.len());
        for course in &self.courses {
            if !ids.contains(&course.id) {
                ids.push(course.id);
            }
        }
        ids
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{id={}, first_name='{}', last_name='{}', courses=[",
            self.id, self.first_name, self.last_name
        )?;
        for (index, course) in self.courses.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{course}")?;
        }
        f.write_str("]}")
    }
}
