//! Search index mirror and query entry points.
//!
//! # Responsibility
//! - Define the generic search capability over one record type.
//! - Keep query-string parsing and result shaping inside core.
//!
//! # Invariants
//! - The index is a denormalized copy; it is never read to answer `get`.
//! - Index documents are keyed by the record store's id.

pub mod document;
pub mod index;
pub mod query;

use crate::db::DbError;
use crate::model::EntityId;
use crate::page::{Page, PageError, PageRequest};
use query::QueryError;
use thiserror::Error;

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for query parsing, index writes and result decoding.
#[derive(Debug, Error)]
pub enum SearchError {
    /// User-provided query string cannot be evaluated.
    #[error("invalid search query `{query}`: {message}")]
    InvalidQuery { query: String, message: String },
    #[error("{entity} document without id cannot be indexed")]
    MissingId { entity: &'static str },
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Page(#[from] PageError),
}

impl SearchError {
    pub(crate) fn from_query(query: &str, err: QueryError) -> Self {
        Self::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Search capability over record type `T`.
///
/// Mirrors [`crate::repo::Repository`] so services can treat both stores alike.
pub trait SearchIndex<T> {
    /// Inserts or replaces the document for `record`'s id.
    fn upsert(&self, record: &T) -> SearchResult<()>;
    /// Removes the document; a missing id is not an error.
    fn delete(&self, id: EntityId) -> SearchResult<()>;
    /// Removes every document of this type.
    fn delete_all(&self) -> SearchResult<()>;
    /// Evaluates a raw query-string expression.
    fn search(&self, query: &str, page: &PageRequest) -> SearchResult<Page<T>>;
}
