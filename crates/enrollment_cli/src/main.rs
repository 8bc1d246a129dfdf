//! Enrollment demo entry point.
//!
//! Links student 1 to courses 1 and 2 and student 2 to course 1 in one
//! transaction, then prints both students. Takes no arguments; the store
//! lives in the working directory.

use enrollment_cli::{report_error, run_enrollment};
use enrollment_core::AppConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    let result = AppConfig::from_current_dir()
        .map_err(Into::into)
        .and_then(|config| run_enrollment(&config, &mut std::io::stdout().lock()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(err.as_ref());
            ExitCode::FAILURE
        }
    }
}
