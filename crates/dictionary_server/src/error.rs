//! Error translation for the REST layer.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors a handler can answer with.
///
/// Alert headers are resolved by [`crate::AppState::translate`] before the
/// error reaches the response, since they depend on the configured app name.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected input; empty body, failure alert headers only.
    #[error("validation failed")]
    Validation { headers: HeaderMap },

    /// Malformed query or sort; failure alert headers plus a short body.
    #[error("bad request: {message}")]
    BadRequest {
        headers: HeaderMap,
        error_key: &'static str,
        message: String,
    },

    #[error("not found")]
    NotFound,

    /// Details are logged where the error is produced, never returned.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    description: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation { headers } => (status, headers).into_response(),
            Self::BadRequest {
                headers,
                error_key,
                message,
            } => {
                let body = ErrorBody {
                    message: format!("error.{error_key}"),
                    description: message,
                };
                (status, headers, Json(body)).into_response()
            }
            Self::NotFound => status.into_response(),
            Self::Internal => {
                let body = ErrorBody {
                    message: "error.internalServerError".to_string(),
                    description: "Internal server error".to_string(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;

    #[test]
    fn statuses_follow_error_kind() {
        let validation = ApiError::Validation {
            headers: HeaderMap::new(),
        };
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
