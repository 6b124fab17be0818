//! Maintenance operations behind the `dictionary_cli` binary.
//!
//! # Responsibility
//! - Rebuild the search index from the record store after divergence.
//!
//! # Invariants
//! - Records are never modified. A missing record store file is created and
//!   migrated on open, so an empty store yields an empty index.

use dictionary_core::db::{open_index_db, open_record_db, share, DbError};
use dictionary_core::{
    CategoryService, ServiceError, SqliteCategoryRepository, SqliteSearchIndex,
    SqliteWordRepository, WordService,
};
use log::info;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BATCH_SIZE: u32 = 500;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Logging(#[from] dictionary_core::LoggingError),
}

/// Documents written per entity type by [`reindex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReindexReport {
    pub categories: u64,
    pub words: u64,
}

/// Clears and refills the index at `index_path` from the records at `db_path`.
///
/// Word documents take their category labels from the record store join, so
/// the order in which entity types are rebuilt does not matter.
pub fn reindex(db_path: &Path, index_path: &Path, batch_size: u32) -> Result<ReindexReport, CliError> {
    let records = share(open_record_db(db_path)?);
    let index = share(open_index_db(index_path)?);

    let categories = CategoryService::new(
        SqliteCategoryRepository::new(records.clone()),
        SqliteSearchIndex::new(index.clone()),
    )
    .reindex(batch_size)?;
    let words = WordService::new(
        SqliteWordRepository::new(records),
        SqliteSearchIndex::new(index),
    )
    .reindex(batch_size)?;

    info!(
        "event=cli_reindex module=cli status=ok categories={} words={}",
        categories, words
    );
    Ok(ReindexReport { categories, words })
}
