//! Record store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the generic persistence capability over one record type.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - `create` never accepts a caller-chosen id; the store assigns it.
//! - `update` is an unconditional upsert by id: no existence or version check.
//! - `delete` of a missing id succeeds silently.

pub mod category_repo;
pub mod word_repo;

use crate::db::DbError;
use crate::model::EntityId;
use crate::page::{Page, PageError, PageRequest};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Record store error.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{entity} already has id {id}; the store assigns ids on create")]
    IdAlreadyAssigned { entity: &'static str, id: EntityId },
    #[error("{entity} without id cannot be updated")]
    MissingId { entity: &'static str },
    /// A row written moments ago could not be read back.
    #[error("{entity} {id} vanished after write")]
    Vanished { entity: &'static str, id: EntityId },
    #[error(transparent)]
    Page(#[from] PageError),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence capability over record type `T`, keyed by [`EntityId`].
pub trait Repository<T> {
    /// Inserts a new record and returns it with its assigned id.
    fn create(&self, record: &T) -> RepoResult<T>;
    /// Writes the record under its id, inserting when the id is unknown.
    fn update(&self, record: &T) -> RepoResult<T>;
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<T>>;
    fn find_all(&self, page: &PageRequest) -> RepoResult<Page<T>>;
    fn delete(&self, id: EntityId) -> RepoResult<()>;
}
