//! Dual-store entity service.
//!
//! # Responsibility
//! - Provide one entry point per CRUD verb plus search for one entity type.
//! - Enforce id presence rules: create rejects ids, update without id creates.
//! - Mirror every successful record store write into the search index.
//!
//! # Invariants
//! - Record store first, index second; the index never runs ahead.
//! - An index failure after a committed record write is surfaced, not undone.
//!   The stores then diverge until [`EntityService::reindex`] runs.
//! - No retries and no cross-request state.

use super::dto::TransferRecord;
use super::mapper::{CategoryMapper, EntityMapper, WordMapper};
use crate::model::{Entity, EntityId};
use crate::page::{Page, PageRequest, SortOrder};
use crate::repo::{RepoError, Repository};
use crate::search::{SearchError, SearchIndex};
use log::{debug, error, info};
use std::marker::PhantomData;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Client input rejected before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A new {entity} cannot already have an ID")]
    IdExists { entity: &'static str },
}

impl ValidationError {
    /// Machine-readable reason code.
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::IdExists { .. } => "idexists",
        }
    }

    pub fn entity(&self) -> &'static str {
        match self {
            Self::IdExists { entity } => *entity,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ServiceError {
    /// Returns true when the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Repo(RepoError::Page(_))
                | Self::Search(SearchError::InvalidQuery { .. } | SearchError::Page(_))
        )
    }
}

/// How `update` ended up persisting the record.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<D> {
    /// Input had no id and was created.
    Created(D),
    Updated(D),
}

impl<D> SaveOutcome<D> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn record(&self) -> &D {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }

    pub fn into_record(self) -> D {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }
}

/// Coordinates the record store `R` and the search index `S` for mapper `M`.
pub struct EntityService<M, R, S> {
    repo: R,
    index: S,
    _mapper: PhantomData<fn() -> M>,
}

pub type WordService<R, S> = EntityService<WordMapper, R, S>;
pub type CategoryService<R, S> = EntityService<CategoryMapper, R, S>;

impl<M, R, S> EntityService<M, R, S>
where
    M: EntityMapper,
    R: Repository<M::Entity>,
    S: SearchIndex<M::Entity>,
{
    pub fn new(repo: R, index: S) -> Self {
        Self {
            repo,
            index,
            _mapper: PhantomData,
        }
    }

    /// Lowercase entity name, e.g. `word`.
    pub fn entity_name(&self) -> &'static str {
        <M::Entity as Entity>::NAME
    }

    /// Persists a new record, then mirrors it into the index.
    ///
    /// # Errors
    /// - `ValidationError::IdExists` when `dto` carries an id; nothing is written.
    /// - Store errors from either write. An index error leaves the record stored.
    pub fn create(&self, dto: &M::Dto) -> ServiceResult<M::Dto> {
        if dto.id().is_some() {
            debug!(
                "event=entity_create module=service status=rejected entity={} error_code=idexists",
                self.entity_name()
            );
            return Err(ValidationError::IdExists {
                entity: self.entity_name(),
            }
            .into());
        }

        let saved = self.repo.create(&M::to_entity(dto))?;
        self.mirror(&saved)?;

        info!(
            "event=entity_create module=service status=ok entity={} id={}",
            self.entity_name(),
            display_id(saved.id())
        );
        Ok(M::to_dto(&saved))
    }

    /// Persists `dto` under its id as an upsert, then mirrors it.
    ///
    /// A `dto` without id is handed to [`Self::create`] and reported as
    /// [`SaveOutcome::Created`].
    pub fn update(&self, dto: &M::Dto) -> ServiceResult<SaveOutcome<M::Dto>> {
        if dto.id().is_none() {
            return self.create(dto).map(SaveOutcome::Created);
        }

        let saved = self.repo.update(&M::to_entity(dto))?;
        self.mirror(&saved)?;

        info!(
            "event=entity_update module=service status=ok entity={} id={}",
            self.entity_name(),
            display_id(saved.id())
        );
        Ok(SaveOutcome::Updated(M::to_dto(&saved)))
    }

    /// Returns one page from the record store.
    pub fn list(&self, page: &PageRequest) -> ServiceResult<Page<M::Dto>> {
        let records = self.repo.find_all(page)?;
        Ok(records.map(|record| M::to_dto(&record)))
    }

    pub fn get(&self, id: EntityId) -> ServiceResult<Option<M::Dto>> {
        let record = self.repo.find_by_id(id)?;
        Ok(record.map(|record| M::to_dto(&record)))
    }

    /// Deletes from the record store, then from the index.
    ///
    /// Missing ids are not an error in either store.
    pub fn delete(&self, id: EntityId) -> ServiceResult<()> {
        self.repo.delete(id)?;
        if let Err(err) = self.index.delete(id) {
            error!(
                "event=index_mirror module=service status=error op=delete entity={} id={} error_code=index_write_failed error={}",
                self.entity_name(),
                id,
                err
            );
            return Err(err.into());
        }

        info!(
            "event=entity_delete module=service status=ok entity={} id={}",
            self.entity_name(),
            id
        );
        Ok(())
    }

    /// Runs a raw query string against the index.
    pub fn search(&self, query: &str, page: &PageRequest) -> ServiceResult<Page<M::Dto>> {
        debug!(
            "event=entity_search module=service status=start entity={} query_chars={}",
            self.entity_name(),
            query.chars().count()
        );
        let hits = self.index.search(query, page)?;
        Ok(hits.map(|record| M::to_dto(&record)))
    }

    /// Rebuilds the index from the record store.
    ///
    /// Clears every document, then re-mirrors all records in id order,
    /// `batch_size` at a time. Returns the number of records indexed.
    pub fn reindex(&self, batch_size: u32) -> ServiceResult<u64> {
        info!(
            "event=reindex module=service status=start entity={}",
            self.entity_name()
        );
        self.index.delete_all()?;

        let mut request = PageRequest::new(0, batch_size).with_sort(SortOrder::asc("id"));
        let mut indexed = 0_u64;
        loop {
            let batch = self.repo.find_all(&request)?;
            for record in &batch.content {
                self.index.upsert(record)?;
                indexed += 1;
            }
            if batch.content.is_empty() || !batch.has_next() {
                break;
            }
            request.page += 1;
        }

        info!(
            "event=reindex module=service status=ok entity={} indexed={}",
            self.entity_name(),
            indexed
        );
        Ok(indexed)
    }

    fn mirror(&self, saved: &M::Entity) -> ServiceResult<()> {
        if let Err(err) = self.index.upsert(saved) {
            error!(
                "event=index_mirror module=service status=error op=upsert entity={} id={} error_code=index_write_failed error={}",
                self.entity_name(),
                display_id(saved.id()),
                err
            );
            return Err(err.into());
        }
        Ok(())
    }
}

fn display_id(id: Option<EntityId>) -> String {
    id.map_or_else(|| "none".to_string(), |id| id.to_string())
}
