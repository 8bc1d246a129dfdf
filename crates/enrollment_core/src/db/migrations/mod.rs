//! Schema upgrades for the enrollment store.
//!
//! # Invariants
//! - Step versions are strictly increasing, starting at 1.
//! - `PRAGMA user_version` always names the last step that was applied.
//! - An upgrade runs in one transaction: a failing step leaves the store at
//!   the version it had before the upgrade started.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

/// One schema step.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "students_courses_and_links",
    sql: include_str!("0001_init.sql"),
}];

/// Returns the schema version this build upgrades stores to.
pub fn latest_version() -> u32 {
    latest_of(SCHEMA_STEPS)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the store is newer than this build.
/// - `Migration { version, .. }` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    apply_steps(conn, SCHEMA_STEPS)
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn latest_of(steps: &[SchemaStep]) -> u32 {
    steps.last().map_or(0, |step| step.version)
}

fn apply_steps(conn: &mut Connection, steps: &[SchemaStep]) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let to_version = latest_of(steps);

    if from_version > to_version {
        error!(
            "event=db_migrate module=db status=error from_version={from_version} to_version={to_version} error_code=schema_too_new"
        );
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }
    if from_version == to_version {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in steps.iter().filter(|step| step.version > from_version) {
        let applied = tx.execute_batch(step.sql).and_then(|()| {
            tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))
        });
        if let Err(source) = applied {
            error!(
                "event=db_migrate module=db status=error from_version={from_version} to_version={to_version} failed_version={} step={} error={source}",
                step.version, step.name
            );
            return Err(DbError::Migration {
                version: step.version,
                source,
            });
        }
        info!(
            "event=db_migrate_step module=db status=ok version={} step={}",
            step.version, step.name
        );
    }
    tx.commit().map_err(|source| DbError::Migration {
        version: to_version,
        source,
    })?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={to_version}");
    Ok(())
}
