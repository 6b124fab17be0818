//! Opening the record store and the search index.
//!
//! # Invariants
//! - Every returned connection enforces foreign keys, waits up to 5 s on a
//!   busy database and is migrated to the latest schema of its kind.

use super::migrations::{apply_migrations, MigrationSet, INDEX_MIGRATIONS, RECORD_MIGRATIONS};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the record database file and applies all pending migrations.
pub fn open_record_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(&RECORD_MIGRATIONS, "file", || Connection::open(path))
}

/// Opens an in-memory record database and applies all pending migrations.
pub fn open_record_db_in_memory() -> DbResult<Connection> {
    open_with(&RECORD_MIGRATIONS, "memory", Connection::open_in_memory)
}

/// Opens the search index database file and applies all pending migrations.
pub fn open_index_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(&INDEX_MIGRATIONS, "file", || Connection::open(path))
}

/// Opens an in-memory search index database and applies all pending migrations.
pub fn open_index_db_in_memory() -> DbResult<Connection> {
    open_with(&INDEX_MIGRATIONS, "memory", Connection::open_in_memory)
}

/// Opens, configures and migrates one connection, logging a `db_open` event
/// with the elapsed time either way.
fn open_with<F>(set: &MigrationSet, mode: &str, open: F) -> DbResult<Connection>
where
    F: FnOnce() -> rusqlite::Result<Connection>,
{
    let started_at = Instant::now();
    let opened = open().map_err(DbError::from).and_then(|mut conn| {
        bootstrap_connection(&mut conn, set)?;
        Ok(conn)
    });
    let duration_ms = started_at.elapsed().as_millis();

    match &opened {
        Ok(_) => info!(
            "event=db_open module=db status=ok database={} mode={} duration_ms={}",
            set.name, mode, duration_ms
        ),
        Err(err) => error!(
            "event=db_open module=db status=error database={} mode={} duration_ms={} error={}",
            set.name, mode, duration_ms, err
        ),
    }
    opened
}

fn bootstrap_connection(conn: &mut Connection, set: &MigrationSet) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn, set)
}
