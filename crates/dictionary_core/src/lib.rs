//! Core domain logic for the bilingual dictionary backend.
//! This crate owns the record store, the search index mirror and the
//! services that keep the two in step.

pub mod db;
pub mod logging;
pub mod model;
pub mod page;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::{Category, Entity, EntityId, Word};
pub use page::{Direction, Page, PageError, PageRequest, SortOrder};
pub use repo::category_repo::SqliteCategoryRepository;
pub use repo::word_repo::SqliteWordRepository;
pub use repo::{RepoError, RepoResult, Repository};
pub use search::document::IndexDocument;
pub use search::index::SqliteSearchIndex;
pub use search::query::QueryError;
pub use search::{SearchError, SearchIndex, SearchResult};
pub use service::dto::{CategoryDto, TransferRecord, WordDto};
pub use service::entity_service::{
    CategoryService, EntityService, SaveOutcome, ServiceError, ServiceResult, ValidationError,
    WordService,
};
pub use service::mapper::{CategoryMapper, EntityMapper, WordMapper};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
