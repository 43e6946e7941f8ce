//! Note CRUD handlers.
//!
//! Every create/update sniffs the content for the first http(s) URL and
//! schedules exactly one link-preview job for it. Read paths degrade
//! silently: anonymous or non-owner callers see an empty list or a 404,
//! never a permission error.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use jotlink_core::{CreateNoteRequest, JobRepository, JobType, Note, NoteRepository, NoteView};
use jotlink_db::first_http_url;

use crate::auth::{Auth, RequireAuth};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NoteBody {
    pub content: String,
    #[serde(default)]
    pub image_id: Option<Uuid>,
}

/// Queue a link-preview job for the first URL in the content, if any.
async fn schedule_link_preview(
    state: &AppState,
    note_id: Uuid,
    content: &str,
) -> Result<(), ApiError> {
    if let Some(url) = first_http_url(content) {
        let job_id = state
            .db
            .jobs
            .queue(
                Some(note_id),
                JobType::LinkPreview,
                Some(json!({ "url": url })),
            )
            .await?;
        debug!(
            subsystem = "api",
            component = "notes",
            note_id = %note_id,
            job_id = %job_id,
            url = %url,
            "Queued link-preview job"
        );
    }
    Ok(())
}

fn to_view(state: &AppState, note: Note) -> NoteView {
    let image_url = note.image_id.map(|id| state.signer.read_path(id));
    NoteView { note, image_url }
}

pub async fn create_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<NoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let note_id = state
        .db
        .notes
        .insert(CreateNoteRequest {
            user_id: auth.user_id,
            content: body.content.clone(),
            image_id: body.image_id,
        })
        .await?;

    schedule_link_preview(&state, note_id, &body.content).await?;

    Ok((StatusCode::CREATED, Json(json!({ "note_id": note_id }))))
}

pub async fn update_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<NoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .access
        .require_note_owner(Some(auth.user_id), id)
        .await?;

    state.db.notes.update(id, &body.content, body.image_id).await?;

    // Re-extraction runs even when the URL did not change; the handler is
    // idempotent.
    schedule_link_preview(&state, id, &body.content).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_note(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    // Missing and not-owned read identically.
    if !state.db.access.may_read_note(auth.user, id).await? {
        return Err(ApiError::NotFound(format!("Note not found: {}", id)));
    }

    let note = state
        .db
        .notes
        .fetch(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Note not found: {}", id)))?;

    Ok(Json(to_view(&state, note)))
}

pub async fn list_notes(
    State(state): State<AppState>,
    auth: Auth,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user_id) = auth.user else {
        return Ok(Json(Vec::new()));
    };

    let notes = state.db.notes.list(user_id).await?;
    let views: Vec<NoteView> = notes.into_iter().map(|n| to_view(&state, n)).collect();

    Ok(Json(views))
}

pub async fn delete_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .access
        .require_note_owner(Some(auth.user_id), id)
        .await?;

    state.db.notes.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
