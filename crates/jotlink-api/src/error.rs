//! HTTP error mapping for the API surface.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// API-level error with an HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
    Internal(jotlink_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    /// Upstream dependency (the chat model) failed or returned nothing.
    UpstreamFailure(String),
}

impl From<jotlink_core::Error> for ApiError {
    fn from(err: jotlink_core::Error) -> Self {
        use jotlink_core::Error;
        match err {
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::NoteNotFound(id) => ApiError::NotFound(format!("Note not found: {}", id)),
            Error::ThreadNotFound(id) => ApiError::NotFound(format!("Thread not found: {}", id)),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Inference(msg) | Error::Request(msg) => ApiError::UpstreamFailure(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UpstreamFailure(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
