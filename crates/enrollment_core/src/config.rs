//! Fixed runtime configuration for the enrollment binaries.
//!
//! Nothing is read from argv or the environment: every path is derived from
//! one base directory, normally the process working directory.

use crate::logging::default_log_level;
use std::io;
use std::path::{Path, PathBuf};

pub const DATABASE_FILE_NAME: &str = "enrollment.sqlite3";
pub const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
}

impl AppConfig {
    /// Lays out the database file and log directory under `base_dir`.
    pub fn from_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        Self {
            database_path: base_dir.join(DATABASE_FILE_NAME),
            log_dir: base_dir.join(LOG_DIR_NAME),
            log_level: default_log_level(),
        }
    }

    /// Same as `from_base_dir` with the current working directory.
    ///
    /// The working directory is absolute, which `init_logging` requires.
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self::from_base_dir(std::env::current_dir()?))
    }
}
