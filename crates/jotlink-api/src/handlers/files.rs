//! Signed upload and download handlers.
//!
//! `/files/:id` is reachable only through HMAC-signed, expiring URLs handed
//! out by `POST /api/uploads` (PUT) and by note views (GET).

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use jotlink_core::AttachmentRepository;
use jotlink_db::PgAttachmentRepository;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

fn attachments(state: &AppState) -> Result<&PgAttachmentRepository, ApiError> {
    state
        .db
        .attachments
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("File storage not configured".to_string()))
}

pub async fn create_upload(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let id = attachments(&state)?.create(auth.user_id).await?;
    let url = state.signer.upload_path(id);

    Ok((StatusCode::CREATED, Json(json!({ "url": url, "image_id": id }))))
}

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: i64,
    pub sig: String,
}

pub async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SignedQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if !state.signer.verify("put", id, query.expires, &query.sig) {
        return Err(ApiError::Forbidden(
            "invalid or expired signature".to_string(),
        ));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    attachments(&state)?.store(id, content_type, &body).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SignedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.signer.verify("get", id, query.expires, &query.sig) {
        return Err(ApiError::Forbidden(
            "invalid or expired signature".to_string(),
        ));
    }

    let (data, content_type) = attachments(&state)?
        .open(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Attachment not found: {}", id)))?;

    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(([(header::CONTENT_TYPE, content_type)], data))
}
