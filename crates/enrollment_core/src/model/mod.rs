//! Domain model for the student/course many-to-many association.
//!
//! # Invariants
//! - Every entity is identified by a positive `i64` primary key.
//! - The student side owns the association; courses learn about their
//!   students only through persisted links.

pub mod course;
pub mod student;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures shared by `Student` and `Course`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Primary keys start at 1.
    NonPositiveId(i64),
    /// A required text field is blank after trim.
    BlankField(&'static str),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveId(id) => write!(f, "id must be positive, got {id}"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn ensure_positive_id(id: i64) -> Result<(), ModelValidationError> {
    if id <= 0 {
        return Err(ModelValidationError::NonPositiveId(id));
    }
    Ok(())
}

pub(crate) fn ensure_not_blank(
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankField(field));
    }
    Ok(())
}
