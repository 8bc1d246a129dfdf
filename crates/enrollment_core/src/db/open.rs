//! Connection bootstrap for the enrollment store.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::{DbError, DbResult, OpenMode};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the enrollment database file and migrates it.
///
/// # Side effects
/// - Emits `db_open` events with `mode=file`, duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with(OpenMode::File(path.to_path_buf()), || Connection::open(path))
}

/// Opens a private in-memory database and migrates it.
///
/// Mostly used by tests; every call yields an independent empty store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(OpenMode::Memory, Connection::open_in_memory)
}

fn open_with(
    mode: OpenMode,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let tag = mode.tag();
    info!("event=db_open module=db status=start mode={tag}");

    let result = match connect() {
        Ok(mut conn) => bootstrap_connection(&mut conn).map(|()| conn),
        Err(source) => Err(DbError::Open { mode, source }),
    };

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={tag} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={tag} duration_ms={} error_code={} error={err}",
            started_at.elapsed().as_millis(),
            error_code(err)
        ),
    }
    result
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(DbError::Configure)?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(DbError::Configure)?;
    apply_migrations(conn)
}

fn error_code(err: &DbError) -> &'static str {
    match err {
        DbError::Open { .. } => "db_open_failed",
        DbError::Configure(_) => "db_configure_failed",
        DbError::Migration { .. } | DbError::UnsupportedSchemaVersion { .. } => {
            "db_migrate_failed"
        }
        DbError::Sqlite(_) => "db_bootstrap_failed",
    }
}
