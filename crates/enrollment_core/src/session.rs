//! Unit-of-work over one SQLite transaction.
//!
//! # Responsibility
//! - Own the transactional scope for entity lookups and association writes.
//! - Track what each loaded student had in storage so a flush writes only
//!   the newly added links.
//!
//! # Invariants
//! - A `Session` borrows its connection mutably for its whole lifetime.
//! - Dropping a `Session` without `commit` rolls back every write.
//! - Only students loaded through this session can be flushed.

use crate::model::course::{Course, CourseId};
use crate::model::student::{Student, StudentId};
use crate::repo::course_repo::{CourseRepository, SqliteCourseRepository};
use crate::repo::student_repo::{SqliteStudentRepository, StudentRepository};
use crate::repo::{ensure_schema_ready, RepoError};
use log::{debug, error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type SessionResult<T> = Result<T, SessionError>;

/// Entity kinds addressable by primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Student,
    Course,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => f.write_str("student"),
            Self::Course => f.write_str("course"),
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    /// A required entity is absent from the store.
    NotFound { kind: EntityKind, id: i64 },
    /// Flush was asked for a student this session never loaded.
    Detached(StudentId),
    Repo(RepoError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Detached(id) => write!(f, "student {id} is not attached to this session"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => err.source(),
            _ => None,
        }
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// One open unit-of-work.
pub struct Session<'conn> {
    tx: Transaction<'conn>,
    snapshots: BTreeMap<StudentId, BTreeSet<CourseId>>,
    links_written: usize,
    started_at: Instant,
}

impl<'conn> Session<'conn> {
    /// Begins an immediate transaction on a migrated connection.
    ///
    /// `IMMEDIATE` takes the write lock up front, so a flush can never fail
    /// on lock upgrade halfway through.
    pub fn begin(conn: &'conn mut Connection) -> SessionResult<Self> {
        ensure_schema_ready(conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("event=session_begin module=session status=ok");
        Ok(Self {
            tx,
            snapshots: BTreeMap::new(),
            links_written: 0,
            started_at: Instant::now(),
        })
    }

    /// Looks up a student with its persisted courses.
    ///
    /// A found student becomes attached: its current course ids are recorded
    /// as the baseline for the next `flush`.
    pub fn find_student(&mut self, id: StudentId) -> SessionResult<Option<Student>> {
        let student = SqliteStudentRepository::new_unchecked(&self.tx).get_student(id)?;
        match &student {
            Some(found) => {
                self.snapshots
                    .insert(id, found.course_ids().into_iter().collect());
                debug!(
                    "event=entity_find module=session status=ok kind=student id={id} courses={}",
                    found.courses.len()
                );
            }
            None => debug!("event=entity_find module=session status=missing kind=student id={id}"),
        }
        Ok(student)
    }

    /// Looks up a course by id.
    pub fn find_course(&self, id: CourseId) -> SessionResult<Option<Course>> {
        let course = SqliteCourseRepository::new_unchecked(&self.tx).get_course(id)?;
        let status = if course.is_some() { "ok" } else { "missing" };
        debug!("event=entity_find module=session status={status} kind=course id={id}");
        Ok(course)
    }

    /// Like `find_student`, but absence is an error.
    pub fn require_student(&mut self, id: StudentId) -> SessionResult<Student> {
        self.find_student(id)?.ok_or(SessionError::NotFound {
            kind: EntityKind::Student,
            id,
        })
    }

    /// Like `find_course`, but absence is an error.
    pub fn require_course(&self, id: CourseId) -> SessionResult<Course> {
        self.find_course(id)?.ok_or(SessionError::NotFound {
            kind: EntityKind::Course,
            id,
        })
    }

    /// Writes association rows for courses added since each student was loaded.
    ///
    /// Returns the number of rows the store actually inserted. Links the
    /// store already holds are skipped by the join table key.
    ///
    /// # Errors
    /// - `Detached` when any student was not loaded through this session.
    ///   Nothing is written in that case.
    pub fn flush(&mut self, students: &[&Student]) -> SessionResult<usize> {
        if let Some(detached) = students.iter().find(|s| !self.snapshots.contains_key(&s.id)) {
            return Err(SessionError::Detached(detached.id));
        }

        let repo = SqliteStudentRepository::new_unchecked(&self.tx);
        let mut written = 0;
        for student in students {
            let snapshot = self.snapshots.entry(student.id).or_default();
            for course_id in student.course_ids() {
                if snapshot.contains(&course_id) {
                    continue;
                }
                if repo.link_course(student.id, course_id)? {
                    written += 1;
                }
                snapshot.insert(course_id);
            }
        }

        self.links_written += written;
        debug!("event=session_flush module=session status=ok links_written={written}");
        Ok(written)
    }

    /// Students linked to `course_id`, as seen inside this transaction.
    pub fn student_ids_for_course(&self, course_id: CourseId) -> SessionResult<Vec<StudentId>> {
        Ok(SqliteCourseRepository::new_unchecked(&self.tx).student_ids_for_course(course_id)?)
    }

    /// Commits every flushed write.
    pub fn commit(self) -> SessionResult<()> {
        let duration_ms = self.started_at.elapsed().as_millis();
        let links_written = self.links_written;
        match self.tx.commit() {
            Ok(()) => {
                info!(
                    "event=session_commit module=session status=ok duration_ms={duration_ms} links_written={links_written}"
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=session_commit module=session status=error duration_ms={duration_ms} error_code=commit_failed error={err}"
                );
                Err(err.into())
            }
        }
    }

    /// Discards every write made in this session.
    pub fn rollback(self) -> SessionResult<()> {
        let duration_ms = self.started_at.elapsed().as_millis();
        self.tx.rollback()?;
        info!("event=session_rollback module=session status=ok duration_ms={duration_ms}");
        Ok(())
    }
}

/// Runs `body` inside a fresh session.
///
/// Commits when `body` returns `Ok`, rolls back when it returns `Err`. The
/// session is released on every path; a panic in `body` drops it, which
/// rolls back.
pub fn run_in_session<T, E, F>(conn: &mut Connection, body: F) -> Result<T, E>
where
    F: FnOnce(&mut Session<'_>) -> Result<T, E>,
    E: From<SessionError> + Display,
{
    let mut session = Session::begin(conn)?;
    match body(&mut session) {
        Ok(value) => {
            session.commit()?;
            Ok(value)
        }
        Err(err) => {
            warn!("event=session_body module=session status=rolled_back error={err}");
            if let Err(rollback_err) = session.rollback() {
                error!(
                    "event=session_rollback module=session status=error error_code=rollback_failed error={rollback_err}"
                );
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run_in_session, EntityKind, Session, SessionError};
    use crate::db::open_db_in_memory;
    use crate::model::course::Course;
    use crate::model::student::Student;
    use crate::repo::course_repo::{CourseRepository, SqliteCourseRepository};
    use crate::repo::student_repo::{SqliteStudentRepository, StudentRepository};
    use rusqlite::Connection;

    fn seeded() -> Connection {
        let conn = open_db_in_memory().unwrap();
        let students = SqliteStudentRepository::try_new(&conn).unwrap();
        let courses = SqliteCourseRepository::try_new(&conn).unwrap();
        students
            .create_student(&Student::new(1, "Ada", "Byron").unwrap())
            .unwrap();
        courses
            .create_course(&Course::new(1, "Math", "Gauss").unwrap())
            .unwrap();
        conn
    }

    fn link_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM student_courses;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn dropped_session_rolls_back_flushed_links() {
        let mut conn = seeded();
        {
            let mut session = Session::begin(&mut conn).unwrap();
            let mut student = session.require_student(1).unwrap();
            student.add_course(session.require_course(1).unwrap());
            assert_eq!(session.flush(&[&student]).unwrap(), 1);
        }
        assert_eq!(link_count(&conn), 0);
    }

    #[test]
    fn flush_rejects_students_not_loaded_by_session() {
        let mut conn = seeded();
        let mut session = Session::begin(&mut conn).unwrap();
        let stranger = Student::new(1, "Ada", "Byron").unwrap();

        let err = session.flush(&[&stranger]).unwrap_err();
        assert!(matches!(err, SessionError::Detached(1)));
    }

    #[test]
    fn flush_twice_writes_each_link_once() {
        let mut conn = seeded();
        let mut session = Session::begin(&mut conn).unwrap();
        let mut student = session.require_student(1).unwrap();
        let course = session.require_course(1).unwrap();
        student.add_course(course.clone());
        student.add_course(course);

        assert_eq!(session.flush(&[&student]).unwrap(), 1);
        assert_eq!(session.flush(&[&student]).unwrap(), 0);
        assert_eq!(session.student_ids_for_course(1).unwrap(), vec![1]);
    }

    #[test]
    fn require_reports_kind_and_id() {
        let mut conn = seeded();
        let mut session = Session::begin(&mut conn).unwrap();

        let err = session.require_student(9).unwrap_err();
        assert!(matches!(
            err,
            SessionError::NotFound {
                kind: EntityKind::Student,
                id: 9
            }
        ));
        assert_eq!(
            session.require_course(7).unwrap_err().to_string(),
            "course not found: 7"
        );
    }

    #[test]
    fn run_in_session_commits_on_ok_and_rolls_back_on_err() {
        let mut conn = seeded();

        let failed: Result<(), SessionError> = run_in_session(&mut conn, |session| {
            let mut student = session.require_student(1)?;
            student.add_course(session.require_course(1)?);
            session.flush(&[&student])?;
            session.require_course(2)?;
            Ok(())
        });
        assert!(failed.is_err());
        assert_eq!(link_count(&conn), 0);

        run_in_session::<_, SessionError, _>(&mut conn, |session| {
            let mut student = session.require_student(1)?;
            student.add_course(session.require_course(1)?);
            session.flush(&[&student])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(link_count(&conn), 1);
    }
}
