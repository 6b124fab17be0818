//! Versioned schemas for the record store and the search index.
//!
//! # Invariants
//! - Versions grow strictly within a set.
//! - `PRAGMA user_version` holds the last applied version; pending steps run
//!   in one transaction.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
pub struct Migration {
    version: u32,
    sql: &'static str,
}

/// An ordered migration list for one database.
#[derive(Debug, Clone, Copy)]
pub struct MigrationSet {
    pub name: &'static str,
    migrations: &'static [Migration],
}

/// Schema of the record store (source of truth).
pub const RECORD_MIGRATIONS: MigrationSet = MigrationSet {
    name: "record",
    migrations: &[Migration {
        version: 1,
        sql: include_str!("record/0001_init.sql"),
    }],
};

/// Schema of the search index mirror.
pub const INDEX_MIGRATIONS: MigrationSet = MigrationSet {
    name: "index",
    migrations: &[
        Migration {
            version: 1,
            sql: include_str!("index/0001_word_document.sql"),
        },
        Migration {
            version: 2,
            sql: include_str!("index/0002_category_document.sql"),
        },
        Migration {
            version: 3,
            sql: include_str!("index/0003_word_category_labels.sql"),
        },
    ],
};

impl MigrationSet {
    /// Returns the latest migration version known by this binary.
    pub fn latest_version(&self) -> u32 {
        self.migrations
            .last()
            .map_or(0, |migration| migration.version)
    }
}

/// Brings `conn` up to `set`'s latest version.
///
/// # Errors
/// [`DbError::UnsupportedSchemaVersion`] when the file is newer than this build.
pub fn apply_migrations(conn: &mut Connection, set: &MigrationSet) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = set.latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            database: set.name,
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let pending = set
        .migrations
        .iter()
        .filter(|migration| migration.version > current_version);
    for migration in pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
