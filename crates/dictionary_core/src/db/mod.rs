//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure the record database and the search index database.
//! - Apply each database's schema migrations in deterministic order.
//!
//! # Invariants
//! - The two databases are independent; no SQL crosses from one to the other.
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.

use parking_lot::Mutex;
use rusqlite::Connection;
use std::sync::Arc;
use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_index_db, open_index_db_in_memory, open_record_db, open_record_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Connection handle shared by every request for the lifetime of the process.
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Wraps an opened connection into a [`SharedConnection`].
pub fn share(conn: Connection) -> SharedConnection {
    Arc::new(Mutex::new(conn))
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{database} schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        database: &'static str,
        db_version: u32,
        latest_supported: u32,
    },
}
