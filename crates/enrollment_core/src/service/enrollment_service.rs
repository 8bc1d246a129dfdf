//! Enrollment use-case service.
//!
//! # Responsibility
//! - Run the enrollment plan as one unit-of-work: load two students and two
//!   courses, link them, flush and commit.
//!
//! # Invariants
//! - Any missing entity aborts the whole plan; nothing is committed.
//! - Re-running a committed plan writes no new rows.

use crate::db::DbError;
use crate::model::course::CourseId;
use crate::model::student::{Student, StudentId};
use crate::repo::RepoError;
use crate::session::{run_in_session, SessionError};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Error surfaced by enrollment entry points.
#[derive(Debug)]
pub enum EnrollmentError {
    /// Store could not be opened or migrated.
    Db(DbError),
    /// The unit-of-work failed and was rolled back.
    Session(SessionError),
}

impl Display for EnrollmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(_) => f.write_str("enrollment store unavailable"),
            Self::Session(_) => f.write_str("enrollment failed"),
        }
    }
}

impl Error for EnrollmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Session(err) => Some(err),
        }
    }
}

impl From<DbError> for EnrollmentError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SessionError> for EnrollmentError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<RepoError> for EnrollmentError {
    fn from(value: RepoError) -> Self {
        Self::Session(SessionError::Repo(value))
    }
}

/// Which rows the plan touches.
///
/// The first student joins both courses; the second joins the first course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentPlan {
    pub first_student: StudentId,
    pub second_student: StudentId,
    pub first_course: CourseId,
    pub second_course: CourseId,
}

impl Default for EnrollmentPlan {
    fn default() -> Self {
        Self {
            first_student: 1,
            second_student: 2,
            first_course: 1,
            second_course: 2,
        }
    }
}

/// In-memory students after a committed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentOutcome {
    pub first_student: Student,
    pub second_student: Student,
    /// Association rows the store actually inserted.
    pub links_written: usize,
}

pub struct EnrollmentService {
    plan: EnrollmentPlan,
}

impl EnrollmentService {
    pub fn new(plan: EnrollmentPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> EnrollmentPlan {
        self.plan
    }

    /// Executes the plan in one session against `conn`.
    pub fn enroll(&self, conn: &mut Connection) -> Result<EnrollmentOutcome, EnrollmentError> {
        let started_at = Instant::now();
        let plan = self.plan;

        let outcome = run_in_session(conn, |session| -> Result<_, EnrollmentError> {
            let mut first_student = session.require_student(plan.first_student)?;
            let mut second_student = session.require_student(plan.second_student)?;
            let first_course = session.require_course(plan.first_course)?;
            let second_course = session.require_course(plan.second_course)?;

            first_student.add_course(first_course.clone());
            first_student.add_course(second_course);
            second_student.add_course(first_course);

            let links_written = session.flush(&[&first_student, &second_student])?;
            Ok(EnrollmentOutcome {
                first_student,
                second_student,
                links_written,
            })
        })?;

        info!(
            "event=enroll module=service status=ok duration_ms={} links_written={}",
            started_at.elapsed().as_millis(),
            outcome.links_written
        );
        Ok(outcome)
    }
}

impl Default for EnrollmentService {
    fn default() -> Self {
        Self::new(EnrollmentPlan::default())
    }
}
