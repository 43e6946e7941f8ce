//! Tests for the link-preview job's fetch path against a stub HTTP server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use jotlink_core::{
    CreateNoteRequest, Error, Job, JobStatus, JobType, LinkMetadata, Note, NoteRepository, Result,
};
use jotlink_jobs::{JobContext, JobHandler, JobResult, LinkPreviewHandler};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-memory note repository recording link-metadata write-backs.
#[derive(Default)]
struct RecordingNotes {
    missing: bool,
    written: Mutex<Vec<(Uuid, LinkMetadata)>>,
}

impl RecordingNotes {
    fn new() -> Self {
        Self::default()
    }

    fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    fn written(&self) -> Vec<(Uuid, LinkMetadata)> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl NoteRepository for RecordingNotes {
    async fn insert(&self, _req: CreateNoteRequest) -> Result<Uuid> {
        unimplemented!("not used by the extraction job")
    }

    async fn update(&self, _id: Uuid, _content: &str, _image_id: Option<Uuid>) -> Result<()> {
        unimplemented!("not used by the extraction job")
    }

    async fn fetch(&self, _id: Uuid) -> Result<Option<Note>> {
        unimplemented!("not used by the extraction job")
    }

    async fn list(&self, _user_id: Uuid) -> Result<Vec<Note>> {
        unimplemented!("not used by the extraction job")
    }

    async fn delete(&self, _id: Uuid) -> Result<()> {
        unimplemented!("not used by the extraction job")
    }

    async fn update_link_metadata(&self, id: Uuid, metadata: &LinkMetadata) -> Result<()> {
        if self.missing {
            return Err(Error::NoteNotFound(id));
        }
        self.written.lock().unwrap().push((id, metadata.clone()));
        Ok(())
    }
}

fn preview_job(note_id: Uuid, url: &str) -> Job {
    Job {
        id: Uuid::new_v4(),
        note_id: Some(note_id),
        job_type: JobType::LinkPreview,
        status: JobStatus::Running,
        payload: Some(serde_json::json!({ "url": url })),
        error_message: None,
        retry_count: 0,
        max_retries: 3,
        created_at: Utc::now(),
        started_at: Some(Utc::now()),
        completed_at: None,
    }
}

#[tokio::test]
async fn test_fetched_title_is_written_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Example Page</title></head></html>"),
        )
        .mount(&server)
        .await;

    let notes = Arc::new(RecordingNotes::new());
    let handler = LinkPreviewHandler::new(notes.clone());
    let note_id = Uuid::new_v4();
    let url = format!("{}/page", server.uri());

    let result = handler
        .execute(JobContext::new(preview_job(note_id, &url)))
        .await;
    assert!(matches!(result, JobResult::Success));

    let written = notes.written();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].0, note_id);
    assert_eq!(written[0].1.url, url);
    assert_eq!(written[0].1.title, "Example Page");
    assert_eq!(written[0].1.description, None);
}

#[tokio::test]
async fn test_fetch_failure_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let notes = Arc::new(RecordingNotes::new());
    let handler = LinkPreviewHandler::new(notes.clone());
    let url = format!("{}/gone", server.uri());

    let result = handler
        .execute(JobContext::new(preview_job(Uuid::new_v4(), &url)))
        .await;

    // Best-effort: the job completes cleanly and the note is untouched.
    assert!(matches!(result, JobResult::Success));
    assert!(notes.written().is_empty());
}

#[tokio::test]
async fn test_titleless_page_leaves_note_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bare"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>hi</body></html>"))
        .mount(&server)
        .await;

    let notes = Arc::new(RecordingNotes::new());
    let handler = LinkPreviewHandler::new(notes.clone());
    let url = format!("{}/bare", server.uri());

    let result = handler
        .execute(JobContext::new(preview_job(Uuid::new_v4(), &url)))
        .await;
    assert!(matches!(result, JobResult::Success));
    assert!(notes.written().is_empty());
}

#[tokio::test]
async fn test_note_deleted_before_write_back_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<title>Still Extracted</title>"),
        )
        .mount(&server)
        .await;

    let notes = Arc::new(RecordingNotes::missing());
    let handler = LinkPreviewHandler::new(notes);
    let url = format!("{}/page", server.uri());

    let result = handler
        .execute(JobContext::new(preview_job(Uuid::new_v4(), &url)))
        .await;
    assert!(matches!(result, JobResult::Success));
}

#[tokio::test]
async fn test_malformed_payload_fails_the_job() {
    let notes = Arc::new(RecordingNotes::new());
    let handler = LinkPreviewHandler::new(notes);

    let mut job = preview_job(Uuid::new_v4(), "https://example.com");
    job.payload = None;

    let result = handler.execute(JobContext::new(job)).await;
    assert!(matches!(result, JobResult::Failed(_)));
}
