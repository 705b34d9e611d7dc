use axum::{http::StatusCode, response::Json};
use serde_json::json;
use tracing::{error, warn};

use crate::models::ValidationError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Restaurant not found")]
    RestaurantNotFound,
    #[error("Invalid JSON body")]
    InvalidInput,
    #[error("Pizza or Restaurant not found")]
    NotFound,
    #[error("validation errors")]
    Validation(#[source] ValidationError),
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingReference => ApiError::NotFound,
            StoreError::Validation(e) => ApiError::Validation(e),
            StoreError::Database(e) => ApiError::Database(e),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            ApiError::RestaurantNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": self.to_string() }),
            ),
            ApiError::InvalidInput => (
                StatusCode::BAD_REQUEST,
                json!({ "errors": [self.to_string()] }),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({ "errors": [self.to_string()] }),
            ),
            ApiError::Validation(reason) => {
                warn!(%reason, "rejected restaurant pizza");
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "errors": [self.to_string()] }),
                )
            }
            ApiError::Database(_) | ApiError::Pool(_) | ApiError::Task(_) => {
                error!(error = %self, "unexpected error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "errors": ["An unexpected error occurred."] }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
