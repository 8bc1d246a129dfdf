use enrollment_core::db::migrations::latest_version;
use enrollment_core::db::open_db_in_memory;
use enrollment_core::{
    Course, CourseRepository, RepoError, SqliteCourseRepository, SqliteStudentRepository,
    Student, StudentRepository,
};
use rusqlite::Connection;

fn seed(conn: &Connection) {
    let students = SqliteStudentRepository::try_new(conn).unwrap();
    let courses = SqliteCourseRepository::try_new(conn).unwrap();
    students
        .create_student(&Student::new(1, "Ada", "Lovelace").unwrap())
        .unwrap();
    students
        .create_student(&Student::new(2, "Alan", "Turing").unwrap())
        .unwrap();
    courses
        .create_course(&Course::new(1, "Programming", "Hopper").unwrap())
        .unwrap();
    courses
        .create_course(&Course::new(2, "Databases", "Codd").unwrap())
        .unwrap();
}

#[test]
fn get_missing_rows_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let courses = SqliteCourseRepository::try_new(&conn).unwrap();

    assert!(students.get_student(1).unwrap().is_none());
    assert!(courses.get_course(1).unwrap().is_none());
}

#[test]
fn get_student_loads_linked_courses_sorted_by_id() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    assert!(students.link_course(1, 2).unwrap());
    assert!(students.link_course(1, 1).unwrap());

    let loaded = students.get_student(1).unwrap().unwrap();
    assert_eq!(loaded.first_name, "Ada");
    assert_eq!(loaded.course_ids(), vec![1, 2]);
    assert_eq!(loaded.courses[1].title, "Databases");
}

#[test]
fn link_course_is_idempotent_at_store_level() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    assert!(students.link_course(2, 1).unwrap());
    assert!(!students.link_course(2, 1).unwrap());
    assert_eq!(students.course_ids_for_student(2).unwrap(), vec![1]);
}

#[test]
fn link_to_missing_course_is_rejected_by_foreign_key() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = students.link_course(1, 99).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn inverse_side_reflects_owning_side_links() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let courses = SqliteCourseRepository::try_new(&conn).unwrap();

    students.link_course(1, 1).unwrap();
    students.link_course(2, 1).unwrap();
    students.link_course(1, 2).unwrap();

    assert_eq!(courses.student_ids_for_course(1).unwrap(), vec![1, 2]);
    assert_eq!(courses.student_ids_for_course(2).unwrap(), vec![1]);
}

#[test]
fn list_returns_rows_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let students = SqliteStudentRepository::try_new(&conn).unwrap();
    let courses = SqliteCourseRepository::try_new(&conn).unwrap();
    students.link_course(2, 2).unwrap();

    let all_students = students.list_students().unwrap();
    let ids: Vec<i64> = all_students.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(all_students[0].courses.is_empty());
    assert_eq!(all_students[1].course_ids(), vec![2]);

    let titles: Vec<String> = courses
        .list_courses()
        .unwrap()
        .into_iter()
        .map(|c| c.title)
        .collect();
    assert_eq!(titles, vec!["Programming", "Databases"]);
}

#[test]
fn create_validates_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let invalid = Student {
        id: 0,
        first_name: "Nobody".to_string(),
        last_name: "Here".to_string(),
        courses: Vec::new(),
    };
    let err = students.create_student(&invalid).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(students.list_students().unwrap().is_empty());
}

#[test]
fn blank_persisted_name_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO students (id, first_name, last_name) VALUES (5, ' ', 'Blank');",
        [],
    )
    .unwrap();
    let students = SqliteStudentRepository::try_new(&conn).unwrap();

    let err = students.get_student(5).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("first_name")));
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteStudentRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_join_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (id INTEGER PRIMARY KEY, first_name TEXT, last_name TEXT);
         CREATE TABLE courses (id INTEGER PRIMARY KEY, title TEXT, professor TEXT);",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCourseRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("student_courses"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE students (id INTEGER PRIMARY KEY, first_name TEXT, last_name TEXT);
         CREATE TABLE courses (id INTEGER PRIMARY KEY, title TEXT);
         CREATE TABLE student_courses (student_id INTEGER, course_id INTEGER);",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteStudentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "courses",
            column: "professor"
        })
    ));
}
