//! Access control: ownership resolution and fail-closed checks.
//!
//! Every note, thread, and message resolves transitively to a note owner
//! (message → thread → note → `user_id`). Writes without an identity or
//! against another user's note fail explicitly; read paths are expected to
//! degrade to empty/absent instead, so a caller can never distinguish
//! "not found" from "not yours".

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use jotlink_core::{Error, Result};

/// PostgreSQL-backed ownership resolution.
pub struct PgAccessControl {
    pool: Pool<Postgres>,
}

impl PgAccessControl {
    /// Create a new PgAccessControl with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Resolve a note to its owner, or `None` if the note does not exist.
    pub async fn note_owner(&self, note_id: Uuid) -> Result<Option<Uuid>> {
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM notes WHERE id = $1")
                .bind(note_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(owner)
    }

    /// Resolve a thread to its parent note's owner.
    pub async fn thread_owner(&self, thread_id: Uuid) -> Result<Option<Uuid>> {
        let owner: Option<Uuid> = sqlx::query_scalar(
            "SELECT n.user_id FROM threads t
             JOIN notes n ON n.id = t.note_id
             WHERE t.id = $1",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(owner)
    }

    /// Fail-closed write check against a note.
    pub async fn require_note_owner(&self, actor: Option<Uuid>, note_id: Uuid) -> Result<Uuid> {
        let actor = actor.ok_or_else(|| Error::Unauthorized("no acting identity".to_string()))?;

        match self.note_owner(note_id).await? {
            None => Err(Error::NoteNotFound(note_id)),
            Some(owner) if owner == actor => Ok(actor),
            Some(_) => Err(Error::Forbidden("not the note owner".to_string())),
        }
    }

    /// Fail-closed write check against a thread (resolved to its note).
    pub async fn require_thread_owner(&self, actor: Option<Uuid>, thread_id: Uuid) -> Result<Uuid> {
        let actor = actor.ok_or_else(|| Error::Unauthorized("no acting identity".to_string()))?;

        match self.thread_owner(thread_id).await? {
            None => Err(Error::ThreadNotFound(thread_id)),
            Some(owner) if owner == actor => Ok(actor),
            Some(_) => Err(Error::Forbidden("not the note owner".to_string())),
        }
    }

    /// Silent read check: true only when an identity is present and owns the
    /// note behind the thread. Missing threads read as not-readable.
    pub async fn may_read_thread(&self, actor: Option<Uuid>, thread_id: Uuid) -> Result<bool> {
        let Some(actor) = actor else {
            return Ok(false);
        };

        Ok(self.thread_owner(thread_id).await? == Some(actor))
    }

    /// Silent read check against a note.
    pub async fn may_read_note(&self, actor: Option<Uuid>, note_id: Uuid) -> Result<bool> {
        let Some(actor) = actor else {
            return Ok(false);
        };

        Ok(self.note_owner(note_id).await? == Some(actor))
    }
}
