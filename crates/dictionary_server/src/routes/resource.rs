//! Generic handlers shared by every entity resource.
//!
//! # Invariants
//! - Store work runs on the blocking pool; handlers only await it.
//! - Query text and record content are never logged.

use crate::error::{ApiError, ApiResult};
use crate::headers::{pagination_headers, search_pagination_headers};
use crate::{AppState, API_BASE};
use axum::extract::{Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dictionary_core::{
    Entity, EntityId, EntityMapper, EntityService, PageRequest, Repository, SaveOutcome,
    SearchIndex, ServiceResult, TransferRecord,
};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// One REST collection backed by an [`EntityService`].
pub trait Resource: Send + Sync + 'static {
    type Mapper: EntityMapper<Dto = Self::Dto> + 'static;
    type Dto: TransferRecord + Serialize + DeserializeOwned + Send + 'static;
    type Repo: Repository<<Self::Mapper as EntityMapper>::Entity> + Send + Sync + 'static;
    type Index: SearchIndex<<Self::Mapper as EntityMapper>::Entity> + Send + Sync + 'static;

    /// Plural path segment, e.g. `words`.
    const COLLECTION: &'static str;

    fn service(state: &AppState) -> Arc<ServiceOf<Self>>;
}

type ServiceOf<R> =
    EntityService<<R as Resource>::Mapper, <R as Resource>::Repo, <R as Resource>::Index>;

/// Routes for `R`, relative to the API base.
pub fn routes<R: Resource>() -> Router<AppState> {
    let collection = format!("/{}", R::COLLECTION);
    let item = format!("/{}/:id", R::COLLECTION);
    let search_path = format!("/_search/{}", R::COLLECTION);

    Router::new()
        .route(
            &collection,
            post(create::<R>).put(update::<R>).get(list::<R>),
        )
        .route(&item, get(fetch::<R>).delete(remove::<R>))
        .route(&search_path, get(search::<R>))
}

fn entity_name<R: Resource>() -> &'static str {
    <<R::Mapper as EntityMapper>::Entity as Entity>::NAME
}

async fn run<R, T, F>(state: &AppState, job: F) -> ApiResult<T>
where
    R: Resource,
    T: Send + 'static,
    F: FnOnce(&ServiceOf<R>) -> ServiceResult<T> + Send + 'static,
{
    let service = R::service(state);
    match tokio::task::spawn_blocking(move || job(&service)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(state.translate(entity_name::<R>(), err)),
        Err(err) => {
            error!(
                "event=rest_request module=api status=error entity={} error_code=blocking_task_failed error={}",
                entity_name::<R>(),
                err
            );
            Err(ApiError::Internal)
        }
    }
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(dto): Json<R::Dto>,
) -> ApiResult<Response> {
    debug!(
        "event=rest_request module=api status=start op=create entity={}",
        entity_name::<R>()
    );
    let created = run::<R, _, _>(&state, move |service| service.create(&dto)).await?;
    Ok(created_response::<R>(&state, created))
}

async fn update<R: Resource>(
    State(state): State<AppState>,
    Json(dto): Json<R::Dto>,
) -> ApiResult<Response> {
    debug!(
        "event=rest_request module=api status=start op=update entity={}",
        entity_name::<R>()
    );
    let outcome = run::<R, _, _>(&state, move |service| service.update(&dto)).await?;

    Ok(match outcome {
        SaveOutcome::Created(record) => created_response::<R>(&state, record),
        SaveOutcome::Updated(record) => {
            let headers = state
                .alerts
                .updated(entity_name::<R>(), &display_id(record.id()));
            (StatusCode::OK, headers, Json(record)).into_response()
        }
    })
}

async fn list<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let request = page_request(&params);
    let page = run::<R, _, _>(&state, move |service| service.list(&request)).await?;

    let headers = pagination_headers(&page, &format!("{API_BASE}/{}", R::COLLECTION));
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

async fn fetch<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> ApiResult<Response> {
    match run::<R, _, _>(&state, move |service| service.get(id)).await? {
        Some(record) => Ok((StatusCode::OK, Json(record)).into_response()),
        None => Err(ApiError::NotFound),
    }
}

async fn remove<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> ApiResult<Response> {
    debug!(
        "event=rest_request module=api status=start op=delete entity={} id={}",
        entity_name::<R>(),
        id
    );
    run::<R, _, _>(&state, move |service| service.delete(id)).await?;

    let headers = state.alerts.deleted(entity_name::<R>(), &id.to_string());
    Ok((StatusCode::OK, headers).into_response())
}

async fn search<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let Some(query) = param(&params, "query").map(str::to_string) else {
        return Err(ApiError::BadRequest {
            headers: state.alerts.failure(entity_name::<R>(), "queryrequired"),
            error_key: "queryrequired",
            message: "required request parameter `query` is missing".to_string(),
        });
    };
    let request = page_request(&params);

    let query_for_job = query.clone();
    let page = run::<R, _, _>(&state, move |service| {
        service.search(&query_for_job, &request)
    })
    .await?;

    let headers = search_pagination_headers(
        &query,
        &page,
        &format!("{API_BASE}/_search/{}", R::COLLECTION),
    );
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

fn created_response<R: Resource>(state: &AppState, record: R::Dto) -> Response {
    let id = display_id(record.id());
    let mut headers = state.alerts.created(entity_name::<R>(), &id);
    if let Ok(location) = HeaderValue::try_from(format!("{API_BASE}/{}/{id}", R::COLLECTION)) {
        headers.insert(LOCATION, location);
    }
    (StatusCode::CREATED, headers, Json(record)).into_response()
}

fn page_request(params: &[(String, String)]) -> PageRequest {
    let sort: Vec<&str> = params
        .iter()
        .filter(|(key, _)| key == "sort")
        .map(|(_, value)| value.as_str())
        .collect();
    PageRequest::from_params(param(params, "page"), param(params, "size"), &sort)
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

fn display_id(id: Option<EntityId>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::page_request;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn page_request_reads_repeated_sort_params() {
        let request = page_request(&pairs(&[
            ("page", "2"),
            ("size", "5"),
            ("sort", "rus,desc"),
            ("sort", "id"),
        ]));

        assert_eq!(request.page, 2);
        assert_eq!(request.size, 5);
        assert_eq!(request.sort.len(), 2);
        assert_eq!(request.sort[0].property, "rus");
        assert_eq!(request.sort[1].property, "id");
    }

    #[test]
    fn page_request_defaults_when_absent() {
        let request = page_request(&[]);
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 20);
        assert!(request.sort.is_empty());
    }
}
