//! REST server for the bilingual dictionary.
//!
//! # Responsibility
//! - Wire record store and search index connections into entity services.
//! - Expose CRUD and search endpoints under `/api` with alert and pagination
//!   headers.
//! - Translate service errors into HTTP statuses.

pub mod config;
pub mod error;
pub mod headers;
pub mod routes;

use axum::routing::get;
use axum::{Json, Router};
use dictionary_core::db::{
    open_index_db, open_index_db_in_memory, open_record_db, open_record_db_in_memory, share,
    DbError, SharedConnection,
};
use dictionary_core::{
    Category, CategoryService, RepoError, SearchError, ServiceError, SqliteCategoryRepository,
    SqliteSearchIndex, SqliteWordRepository, Word, WordService,
};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

pub use config::{Cli, ServerConfig, StorageConfig};
pub use error::{ApiError, ApiResult};
pub use headers::{AlertHeaders, InvalidAppName};

pub const API_BASE: &str = "/api";

pub type WordApiService = WordService<SqliteWordRepository, SqliteSearchIndex<Word>>;
pub type CategoryApiService =
    CategoryService<SqliteCategoryRepository, SqliteSearchIndex<Category>>;

/// Failure to bring the server up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    AppName(#[from] InvalidAppName),
    #[error(transparent)]
    Logging(#[from] dictionary_core::LoggingError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared handler state; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub words: Arc<WordApiService>,
    pub categories: Arc<CategoryApiService>,
    pub alerts: Arc<AlertHeaders>,
}

impl AppState {
    /// Builds both services over one record store and one index connection.
    pub fn new(records: SharedConnection, index: SharedConnection, alerts: AlertHeaders) -> Self {
        let words = WordService::new(
            SqliteWordRepository::new(records.clone()),
            SqliteSearchIndex::new(index.clone()),
        );
        let categories = CategoryService::new(
            SqliteCategoryRepository::new(records),
            SqliteSearchIndex::new(index),
        );
        Self {
            words: Arc::new(words),
            categories: Arc::new(categories),
            alerts: Arc::new(alerts),
        }
    }

    /// Opens the stores named by `config` and builds the state over them.
    pub fn open(config: &ServerConfig) -> Result<Self, StartupError> {
        let alerts = AlertHeaders::new(&config.app_name)?;
        let (records, index) = match &config.storage {
            StorageConfig::InMemory => (open_record_db_in_memory()?, open_index_db_in_memory()?),
            StorageConfig::Files { db, index } => (open_record_db(db)?, open_index_db(index)?),
        };
        Ok(Self::new(share(records), share(index), alerts))
    }

    /// Fresh in-memory stores; nothing is persisted.
    pub fn in_memory(app_name: &str) -> Result<Self, StartupError> {
        let config = ServerConfig::default()
            .with_storage(StorageConfig::InMemory)
            .with_app_name(app_name);
        Self::open(&config)
    }

    /// Maps a service failure to its HTTP form for `entity`.
    pub fn translate(&self, entity: &'static str, err: ServiceError) -> ApiError {
        let error_key = match &err {
            ServiceError::Validation(validation) => {
                info!(
                    "event=rest_request module=api status=rejected entity={} error_code={}",
                    entity,
                    validation.error_key()
                );
                return ApiError::Validation {
                    headers: self
                        .alerts
                        .failure(validation.entity(), validation.error_key()),
                };
            }
            ServiceError::Search(SearchError::InvalidQuery { .. }) => "invalidquery",
            ServiceError::Repo(RepoError::Page(_)) | ServiceError::Search(SearchError::Page(_)) => {
                "invalidsort"
            }
            _ => {
                error!(
                    "event=rest_request module=api status=error entity={} error_code=internal error={}",
                    entity, err
                );
                return ApiError::Internal;
            }
        };

        info!(
            "event=rest_request module=api status=rejected entity={} error_code={}",
            entity, error_key
        );
        ApiError::BadRequest {
            headers: self.alerts.failure(entity, error_key),
            error_key,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PingBody {
    status: &'static str,
    version: &'static str,
}

async fn ping() -> Json<PingBody> {
    Json(PingBody {
        status: dictionary_core::ping(),
        version: dictionary_core::core_version(),
    })
}

/// Full application router with state attached.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/ping", get(ping))
        .merge(routes::routes::<routes::Words>())
        .merge(routes::routes::<routes::Categories>());

    Router::new().nest(API_BASE, api).with_state(state)
}

/// Binds `config.bind_addr` and serves until the listener fails.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<(), StartupError> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: config.bind_addr,
            source,
        })?;
    info!(
        "event=server_start module=server status=ok addr={} app_name={}",
        config.bind_addr,
        state.alerts.app_name()
    );

    axum::serve(listener, build_router(state))
        .await
        .map_err(StartupError::Serve)
}
