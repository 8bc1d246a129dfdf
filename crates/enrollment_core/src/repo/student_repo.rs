//! Student repository contract and SQLite implementation.
//!
//! # Invariants
//! - `get_student` returns the student with every linked course, sorted by
//!   course id.
//! - `link_course` never fails on an existing link; it reports `false`.

use crate::model::course::CourseId;
use crate::model::student::{Student, StudentId};
use crate::repo::course_repo::parse_course_row;
use crate::repo::{ensure_schema_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const STUDENT_SELECT_SQL: &str = "SELECT id, first_name, last_name FROM students";

/// Repository interface for students and the owning association side.
pub trait StudentRepository {
    /// Inserts the student row. `student.courses` is ignored.
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// Writes one association row; returns `false` when it already existed.
    fn link_course(&self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool>;
    fn course_ids_for_student(&self, student_id: StudentId) -> RepoResult<Vec<CourseId>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    /// Skips the schema check; callers must have run it on `conn` already.
    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_courses(&self, student: &mut Student) -> RepoResult<()> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.title, c.professor
             FROM student_courses sc
             INNER JOIN courses c ON c.id = sc.course_id
             WHERE sc.student_id = ?1
             ORDER BY c.id ASC;",
        )?;
        let mut rows = stmt.query([student.id])?;
        while let Some(row) = rows.next()? {
            student.courses.push(parse_course_row(row)?);
        }
        Ok(())
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO students (id, first_name, last_name) VALUES (?1, ?2, ?3);",
            params![
                student.id,
                student.first_name.as_str(),
                student.last_name.as_str()
            ],
        )?;

        Ok(student.id)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut student = parse_student_row(row)?;
        self.load_courses(&mut student)?;
        Ok(Some(student))
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        for student in &mut students {
            self.load_courses(student)?;
        }
        Ok(students)
    }

    fn link_course(&self, student_id: StudentId, course_id: CourseId) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO student_courses (student_id, course_id) VALUES (?1, ?2);",
            params![student_id, course_id],
        )?;
        Ok(inserted == 1)
    }

    fn course_ids_for_student(&self, student_id: StudentId) -> RepoResult<Vec<CourseId>> {
        let mut stmt = self.conn.prepare(
            "SELECT course_id
             FROM student_courses
             WHERE student_id = ?1
             ORDER BY course_id ASC;",
        )?;
        let mut rows = stmt.query([student_id])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: i64 = row.get("id")?;
    let student = Student {
        id,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        courses: Vec::new(),
    };
    student
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("students row {id}: {err}")))?;
    Ok(student)
}
