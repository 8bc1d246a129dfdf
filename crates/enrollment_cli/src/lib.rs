//! Shared plumbing for the enrollment binaries.
//!
//! # Responsibility
//! - Start logging and open the configured store the same way for every
//!   binary.
//! - Render failures with their full cause chain on stderr.

use enrollment_core::db::open_db;
use enrollment_core::{init_logging, seed_demo_data, AppConfig, EnrollmentService, SeedReport};
use log::info;
use std::error::Error;
use std::io::Write;

pub type CliResult<T> = Result<T, Box<dyn Error>>;

/// Runs the enrollment plan against the configured store and writes both
/// students to `out`, one per line.
pub fn run_enrollment(config: &AppConfig, out: &mut impl Write) -> CliResult<()> {
    init_logging(config.log_level, &config.log_dir)?;
    let mut conn = open_db(&config.database_path)?;

    let outcome = EnrollmentService::default().enroll(&mut conn)?;
    writeln!(out, "{}", outcome.first_student)?;
    writeln!(out, "{}", outcome.second_student)?;

    info!(
        "event=cli_enroll module=cli status=ok links_written={}",
        outcome.links_written
    );
    Ok(())
}

/// Creates the demo students and courses in the configured store when missing.
pub fn run_seed(config: &AppConfig) -> CliResult<SeedReport> {
    init_logging(config.log_level, &config.log_dir)?;
    let mut conn = open_db(&config.database_path)?;
    Ok(seed_demo_data(&mut conn)?)
}

/// Prints `err` and each of its sources to stderr.
pub fn report_error(err: &dyn Error) {
    eprintln!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
