//! Creates the rows the enrollment demo expects: students 1 and 2,
//! courses 1 and 2. Safe to re-run.

use enrollment_cli::{report_error, run_seed};
use enrollment_core::AppConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    let result = AppConfig::from_current_dir()
        .map_err(Into::into)
        .and_then(|config| run_seed(&config));

    match result {
        Ok(report) => {
            println!(
                "seeded students_created={} courses_created={}",
                report.students_created, report.courses_created
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(err.as_ref());
            ExitCode::FAILURE
        }
    }
}
