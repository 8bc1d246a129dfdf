//! Enrollment store bootstrap: connection setup and schema upgrades.
//!
//! Every connection handed out by this module has foreign keys enforced and
//! the `students`/`courses`/`student_courses` schema at `latest_version()`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Where a connection was being opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenMode {
    File(PathBuf),
    Memory,
}

impl OpenMode {
    /// Short tag used in `event=db_open` log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

impl Display for OpenMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "`{}`", path.display()),
            Self::Memory => f.write_str("in-memory store"),
        }
    }
}

#[derive(Debug)]
pub enum DbError {
    /// SQLite refused to open the store at all.
    Open {
        mode: OpenMode,
        source: rusqlite::Error,
    },
    /// Connection pragmas could not be applied.
    Configure(rusqlite::Error),
    /// One schema step failed; nothing from the upgrade was kept.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, .. } => write!(f, "cannot open enrollment store {mode}"),
            Self::Configure(_) => f.write_str("cannot configure enrollment store"),
            Self::Migration { version, .. } => write!(f, "schema migration {version} failed"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "enrollment store is at schema {db_version}, this build only knows up to {latest_supported}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Configure(err) => Some(err),
            Self::Sqlite(err) => err.source(),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
