//! Course repository contract and SQLite implementation.

use crate::model::course::{Course, CourseId};
use crate::model::student::StudentId;
use crate::repo::{ensure_schema_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const COURSE_SELECT_SQL: &str = "SELECT id, title, professor FROM courses";

/// Repository interface for course reads and the inverse association side.
pub trait CourseRepository {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId>;
    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>>;
    fn list_courses(&self) -> RepoResult<Vec<Course>>;
    /// Students linked to `course_id`, ascending.
    fn student_ids_for_course(&self, course_id: CourseId) -> RepoResult<Vec<StudentId>>;
}

/// SQLite-backed course repository.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    /// Skips the schema check; callers must have run it on `conn` already.
    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn create_course(&self, course: &Course) -> RepoResult<CourseId> {
        course.validate()?;

        self.conn.execute(
            "INSERT INTO courses (id, title, professor) VALUES (?1, ?2, ?3);",
            params![course.id, course.title.as_str(), course.professor.as_str()],
        )?;

        Ok(course.id)
    }

    fn get_course(&self, id: CourseId) -> RepoResult<Option<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_course_row(row)?));
        }

        Ok(None)
    }

    fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COURSE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(parse_course_row(row)?);
        }
        Ok(courses)
    }

    fn student_ids_for_course(&self, course_id: CourseId) -> RepoResult<Vec<StudentId>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id
             FROM student_courses
             WHERE course_id = ?1
             ORDER BY student_id ASC;",
        )?;
        let mut rows = stmt.query([course_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

pub(crate) fn parse_course_row(row: &Row<'_>) -> RepoResult<Course> {
    let id: i64 = row.get("id")?;
    let course = Course {
        id,
        title: row.get("title")?,
        professor: row.get("professor")?,
    };
    course
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("courses row {id}: {err}")))?;
    Ok(course)
}
