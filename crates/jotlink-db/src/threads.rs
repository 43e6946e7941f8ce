//! Thread repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use jotlink_core::{Error, Result, Thread, ThreadRepository};

/// PostgreSQL implementation of ThreadRepository.
pub struct PgThreadRepository {
    pool: Pool<Postgres>,
}

impl PgThreadRepository {
    /// Create a new PgThreadRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    async fn get_or_create(&self, note_id: Uuid) -> Result<Uuid> {
        // The unique index on note_id makes the insert race-safe: of two
        // concurrent callers, one inserts and the other falls through to
        // the select and sees the same row.
        let id = Uuid::now_v7();

        let inserted: Option<Uuid> = sqlx::query_scalar(
            "INSERT INTO threads (id, note_id) VALUES ($1, $2)
             ON CONFLICT (note_id) DO NOTHING
             RETURNING id",
        )
        .bind(id)
        .bind(note_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if let Some(id) = inserted {
            return Ok(id);
        }

        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM threads WHERE note_id = $1")
                .bind(note_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        existing.ok_or(Error::NoteNotFound(note_id))
    }

    async fn find_by_note(&self, note_id: Uuid) -> Result<Option<Thread>> {
        let row = sqlx::query("SELECT id, note_id FROM threads WHERE note_id = $1")
            .bind(note_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|row| {
            Ok(Thread {
                id: row.try_get("id").map_err(Error::Database)?,
                note_id: row.try_get("note_id").map_err(Error::Database)?,
            })
        })
        .transpose()
    }

    async fn note_for_thread(&self, thread_id: Uuid) -> Result<Option<Uuid>> {
        let note_id: Option<Uuid> =
            sqlx::query_scalar("SELECT note_id FROM threads WHERE id = $1")
                .bind(thread_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(note_id)
    }
}
