//! Demo fixture rows for the enrollment store.
//!
//! # Invariants
//! - Only missing rows are inserted; existing rows and links are untouched.
//! - All inserts happen in one transaction.

use crate::model::course::Course;
use crate::model::student::Student;
use crate::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use crate::repo::student_repo::{SqliteStudentRepository, StudentRepository};
use crate::repo::{ensure_schema_ready, RepoResult};
use log::info;
use rusqlite::Connection;

const DEMO_STUDENTS: &[(i64, &str, &str)] = &[(1, "Ada", "Lovelace"), (2, "Alan", "Turing")];
const DEMO_COURSES: &[(i64, &str, &str)] = &[(1, "Programming", "Hopper"), (2, "Databases", "Codd")];

/// Rows created by one `seed_demo_data` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub students_created: usize,
    pub courses_created: usize,
}

/// Creates students 1..=2 and courses 1..=2 when absent.
pub fn seed_demo_data(conn: &mut Connection) -> RepoResult<SeedReport> {
    ensure_schema_ready(conn)?;
    let tx = conn.transaction()?;
    let mut report = SeedReport::default();
    {
        let students = SqliteStudentRepository::new_unchecked(&tx);
        for &(id, first_name, last_name) in DEMO_STUDENTS {
            if students.get_student(id)?.is_none() {
                students.create_student(&Student::new(id, first_name, last_name)?)?;
                report.students_created += 1;
            }
        }

        let courses = SqliteCourseRepository::new_unchecked(&tx);
        for &(id, title, professor) in DEMO_COURSES {
            if courses.get_course(id)?.is_none() {
                courses.create_course(&Course::new(id, title, professor)?)?;
                report.courses_created += 1;
            }
        }
    }
    tx.commit()?;

    info!(
        "event=seed module=seed status=ok students_created={} courses_created={}",
        report.students_created, report.courses_created
    );
    Ok(report)
}
