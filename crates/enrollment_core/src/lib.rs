//! Core of the enrollment demo: SQLite storage for students and courses,
//! and a unit-of-work session for extending their many-to-many association.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod session;

pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::course::{Course, CourseId};
pub use model::student::{Student, StudentId};
pub use model::ModelValidationError;
pub use repo::course_repo::{CourseRepository, SqliteCourseRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{RepoError, RepoResult};
pub use seed::{seed_demo_data, SeedReport};
pub use service::enrollment_service::{
    EnrollmentError, EnrollmentOutcome, EnrollmentPlan, EnrollmentService,
};
pub use session::{run_in_session, EntityKind, Session, SessionError, SessionResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
