//! Message repository implementation.
//!
//! Messages are append-only: created with a server-assigned timestamp, never
//! mutated, and deleted only in bulk when their parent thread's note goes.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use jotlink_core::{Error, Message, MessageRepository, MessageType, Result};

/// PostgreSQL implementation of MessageRepository.
pub struct PgMessageRepository {
    pool: Pool<Postgres>,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_message_row(row: sqlx::postgres::PgRow) -> Result<Message> {
    let type_str: String = row.try_get("message_type").map_err(Error::Database)?;
    let message_type = MessageType::parse(&type_str)
        .ok_or_else(|| Error::Internal(format!("unknown message type: {}", type_str)))?;

    Ok(Message {
        id: row.try_get("id").map_err(Error::Database)?,
        thread_id: row.try_get("thread_id").map_err(Error::Database)?,
        content: row.try_get("content").map_err(Error::Database)?,
        message_type,
        created_time: row.try_get("created_time").map_err(Error::Database)?,
    })
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(
        &self,
        thread_id: Uuid,
        content: &str,
        message_type: MessageType,
    ) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        // The foreign key guarantees the thread is live at creation time.
        sqlx::query(
            "INSERT INTO messages (id, thread_id, content, message_type, created_time)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(thread_id)
        .bind(content)
        .bind(message_type.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Error::ThreadNotFound(thread_id)
            }
            _ => Error::Database(e),
        })?;

        Ok(id)
    }

    async fn list(&self, thread_id: Uuid) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT id, thread_id, content, message_type, created_time
             FROM messages WHERE thread_id = $1
             ORDER BY created_time ASC",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(map_message_row).collect()
    }
}
