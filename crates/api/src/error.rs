use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use site_builder_core::document::validate::ValidationError;
use site_builder_core::MigrationError;

/// API error type rendered as `{ "error": { type, message, statusCode } }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("invalid document: {0}")]
    Validation(#[from] ValidationError),

    #[error("cannot read document: {0}")]
    Migration(#[from] MigrationError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Body(rejection) => (rejection.status(), "badRequest", rejection.body_text()),
            ApiError::Validation(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalidDocument", err.to_string())
            }
            ApiError::Migration(err) => (StatusCode::BAD_REQUEST, "badRequest", err.to_string()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Storage(err) => {
                tracing::error!("Storage error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
