//! Job queue repository implementation.
//!
//! Deferred one-shot jobs run after the triggering mutation commits. Claiming
//! uses `FOR UPDATE SKIP LOCKED` so concurrent workers never double-claim.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use jotlink_core::{defaults, Error, Job, JobRepository, JobStatus, JobType, Result};

/// PostgreSQL implementation of JobRepository.
pub struct PgJobRepository {
    pool: Pool<Postgres>,
}

impl PgJobRepository {
    /// Create a new PgJobRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Parse a job row into a Job struct.
    fn parse_job_row(row: sqlx::postgres::PgRow) -> Result<Job> {
        let type_str: String = row.try_get("job_type").map_err(Error::Database)?;
        let job_type = JobType::parse(&type_str)
            .ok_or_else(|| Error::Job(format!("unknown job type: {}", type_str)))?;

        let status_str: String = row.try_get("status").map_err(Error::Database)?;
        let status = JobStatus::parse(&status_str)
            .ok_or_else(|| Error::Job(format!("unknown job status: {}", status_str)))?;

        Ok(Job {
            id: row.try_get("id").map_err(Error::Database)?,
            note_id: row.try_get("note_id").map_err(Error::Database)?,
            job_type,
            status,
            payload: row.try_get("payload").map_err(Error::Database)?,
            error_message: row.try_get("error_message").map_err(Error::Database)?,
            retry_count: row.try_get("retry_count").map_err(Error::Database)?,
            max_retries: row.try_get("max_retries").map_err(Error::Database)?,
            created_at: row.try_get("created_at").map_err(Error::Database)?,
            started_at: row.try_get("started_at").map_err(Error::Database)?,
            completed_at: row.try_get("completed_at").map_err(Error::Database)?,
        })
    }
}

const JOB_COLUMNS: &str = "id, note_id, job_type, status, payload, error_message, \
     retry_count, max_retries, created_at, started_at, completed_at";

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn queue(
        &self,
        note_id: Option<Uuid>,
        job_type: JobType,
        payload: Option<JsonValue>,
    ) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO job_queue (id, note_id, job_type, status, payload, max_retries, created_at)
             VALUES ($1, $2, $3, 'pending', $4, $5, $6)",
        )
        .bind(id)
        .bind(note_id)
        .bind(job_type.as_str())
        .bind(&payload)
        .bind(defaults::JOB_MAX_RETRIES)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn claim_next(&self) -> Result<Option<Job>> {
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "UPDATE job_queue SET status = 'running', started_at = $1
             WHERE id = (
                 SELECT id FROM job_queue
                 WHERE status = 'pending'
                 ORDER BY created_at
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(Self::parse_job_row).transpose()
    }

    async fn complete(&self, id: Uuid) -> Result<()> {
        let now = Utc::now();

        sqlx::query(
            "UPDATE job_queue SET status = 'completed', completed_at = $2, error_message = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn fail(&self, id: Uuid, error: &str) -> Result<()> {
        let now = Utc::now();

        // Returns the job to pending while retries remain; the worker will
        // re-claim it on a later poll.
        sqlx::query(
            "UPDATE job_queue SET
                 retry_count = retry_count + 1,
                 error_message = $2,
                 status = CASE WHEN retry_count + 1 >= max_retries
                               THEN 'failed' ELSE 'pending' END,
                 completed_at = CASE WHEN retry_count + 1 >= max_retries
                                     THEN $3 ELSE NULL END
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM job_queue WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(Self::parse_job_row).transpose()
    }
}
