//! Job handler trait and execution context.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use jotlink_core::{Job, JobType};

/// Context provided to job handlers.
pub struct JobContext {
    /// The job being processed.
    pub job: Job,
}

impl JobContext {
    /// Create a new job context.
    pub fn new(job: Job) -> Self {
        Self { job }
    }

    /// Get the note ID for this job, if any.
    pub fn note_id(&self) -> Option<Uuid> {
        self.job.note_id
    }

    /// Get the job payload.
    pub fn payload(&self) -> Option<&JsonValue> {
        self.job.payload.as_ref()
    }

    /// Get a string field out of the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload().and_then(|p| p.get(key)).and_then(|v| v.as_str())
    }
}

/// Result of job execution.
#[derive(Debug)]
pub enum JobResult {
    /// Job completed successfully.
    Success,
    /// Job failed with an error message. The queue re-delivers it while
    /// retries remain.
    Failed(String),
}

/// Trait for job handlers.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The job type this handler processes.
    fn job_type(&self) -> JobType;

    /// Execute the job.
    async fn execute(&self, ctx: JobContext) -> JobResult;
}

/// No-op handler for testing.
pub struct NoOpHandler {
    job_type: JobType,
}

impl NoOpHandler {
    /// Create a new no-op handler for the given job type.
    pub fn new(job_type: JobType) -> Self {
        Self { job_type }
    }
}

#[async_trait]
impl JobHandler for NoOpHandler {
    fn job_type(&self) -> JobType {
        self.job_type
    }

    async fn execute(&self, _ctx: JobContext) -> JobResult {
        JobResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jotlink_core::JobStatus;

    fn test_job(payload: Option<JsonValue>) -> Job {
        Job {
            id: Uuid::new_v4(),
            note_id: Some(Uuid::new_v4()),
            job_type: JobType::LinkPreview,
            status: JobStatus::Running,
            payload,
            error_message: None,
            retry_count: 0,
            max_retries: 3,
            created_at: Utc::now(),
            started_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    #[test]
    fn test_payload_str_reads_field() {
        let ctx = JobContext::new(test_job(Some(
            serde_json::json!({"url": "https://example.com"}),
        )));
        assert_eq!(ctx.payload_str("url"), Some("https://example.com"));
        assert_eq!(ctx.payload_str("missing"), None);
    }

    #[test]
    fn test_payload_str_without_payload() {
        let ctx = JobContext::new(test_job(None));
        assert_eq!(ctx.payload_str("url"), None);
    }

    #[tokio::test]
    async fn test_noop_handler_succeeds() {
        let handler = NoOpHandler::new(JobType::LinkPreview);
        assert_eq!(handler.job_type(), JobType::LinkPreview);
        let result = handler.execute(JobContext::new(test_job(None))).await;
        assert!(matches!(result, JobResult::Success));
    }
}
