//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use jotlink_core::{
    CreateNoteRequest, Error, LinkMetadata, Note, NoteRepository, Result,
};

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a database row to a Note.
fn map_note_row(row: sqlx::postgres::PgRow) -> Result<Note> {
    let metadata: Option<JsonValue> = row.try_get("link_metadata").map_err(Error::Database)?;
    let link_metadata = match metadata {
        Some(value) => Some(serde_json::from_value::<LinkMetadata>(value)?),
        None => None,
    };

    Ok(Note {
        id: row.try_get("id").map_err(Error::Database)?,
        user_id: row.try_get("user_id").map_err(Error::Database)?,
        content: row.try_get("content").map_err(Error::Database)?,
        image_id: row.try_get("image_id").map_err(Error::Database)?,
        link_metadata,
        updated_time: row.try_get("updated_time").map_err(Error::Database)?,
    })
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Uuid> {
        // Client-side validation is advisory; the store rejects malformed
        // input as well.
        if req.content.trim().is_empty() && req.image_id.is_none() {
            return Err(Error::InvalidInput(
                "note requires content or an image".to_string(),
            ));
        }

        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO notes (id, user_id, content, image_id, updated_time)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(req.user_id)
        .bind(&req.content)
        .bind(req.image_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn update(&self, id: Uuid, content: &str, image_id: Option<Uuid>) -> Result<()> {
        let now = Utc::now();

        // Image reference is only replaced when a new one is supplied,
        // matching the patch semantics of the original mutation.
        let result = sqlx::query(
            "UPDATE notes
             SET content = $2,
                 image_id = COALESCE($3, image_id),
                 updated_time = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(content)
        .bind(image_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(
            "SELECT id, user_id, content, image_id, link_metadata, updated_time
             FROM notes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(map_note_row).transpose()
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, user_id, content, image_id, link_metadata, updated_time
             FROM notes WHERE user_id = $1
             ORDER BY updated_time DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_note_row).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Messages, then thread, then the note itself. The ordering keeps a
        // mid-transaction failure from leaving orphaned rows behind.
        let thread_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM threads WHERE note_id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;

        if let Some(thread_id) = thread_id {
            sqlx::query("DELETE FROM messages WHERE thread_id = $1")
                .bind(thread_id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;

            sqlx::query("DELETE FROM threads WHERE id = $1")
                .bind(thread_id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }

        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn update_link_metadata(&self, id: Uuid, metadata: &LinkMetadata) -> Result<()> {
        let value = serde_json::to_value(metadata)?;

        // Deliberately does not bump updated_time: this is the deferred
        // job's write-back, not a user edit. Last writer wins if it races
        // with a concurrent edit.
        let result = sqlx::query("UPDATE notes SET link_metadata = $2 WHERE id = $1")
            .bind(id)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }
}
