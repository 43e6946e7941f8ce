//! Port traits for jotlink abstractions.
//!
//! The original design reached for its platform through ambient context
//! handles. Here every external collaborator (durable store, object storage,
//! job scheduler, identity provider, chat model) is an explicit trait so
//! concrete backends stay pluggable and the service layer stays testable.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Request for creating a new note.
#[derive(Debug, Clone)]
pub struct CreateNoteRequest {
    /// The authenticated actor creating the note; becomes the owner.
    pub user_id: Uuid,
    pub content: String,
    pub image_id: Option<Uuid>,
}

/// Repository for note CRUD operations.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note. Rejects empty content with no image attached.
    async fn insert(&self, req: CreateNoteRequest) -> Result<Uuid>;

    /// Replace content and image reference, bumping `updated_time`.
    async fn update(&self, id: Uuid, content: &str, image_id: Option<Uuid>) -> Result<()>;

    /// Fetch a note by ID, or `None` if it does not exist.
    async fn fetch(&self, id: Uuid) -> Result<Option<Note>>;

    /// List a user's notes, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Note>>;

    /// Delete a note, cascading to its thread and that thread's messages.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Write extracted link metadata back onto a note (last writer wins).
    async fn update_link_metadata(&self, id: Uuid, metadata: &LinkMetadata) -> Result<()>;
}

/// Repository for per-note conversation threads.
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Return the existing thread for a note, creating one if absent.
    /// Calling this twice for the same note yields the same thread id.
    async fn get_or_create(&self, note_id: Uuid) -> Result<Uuid>;

    /// Look up the thread attached to a note, if any.
    async fn find_by_note(&self, note_id: Uuid) -> Result<Option<Thread>>;

    /// Resolve a thread to its parent note id.
    async fn note_for_thread(&self, thread_id: Uuid) -> Result<Option<Uuid>>;
}

/// Repository for thread messages. This is the trusted write path: ownership
/// checks happen above it, in the access-control layer.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append a message with a server-assigned creation timestamp.
    async fn insert(
        &self,
        thread_id: Uuid,
        content: &str,
        message_type: MessageType,
    ) -> Result<Uuid>;

    /// List a thread's messages ascending by creation time.
    async fn list(&self, thread_id: Uuid) -> Result<Vec<Message>>;
}

/// Repository for the deferred job queue.
///
/// Delivery is at-least-once with no ordering guarantee; handlers must be
/// idempotent.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Enqueue a job for later execution.
    async fn queue(
        &self,
        note_id: Option<Uuid>,
        job_type: JobType,
        payload: Option<JsonValue>,
    ) -> Result<Uuid>;

    /// Atomically claim the oldest pending job, marking it running.
    async fn claim_next(&self) -> Result<Option<Job>>;

    /// Mark a job completed.
    async fn complete(&self, id: Uuid) -> Result<()>;

    /// Record a failure. Returns the job to pending while retries remain,
    /// otherwise marks it failed.
    async fn fail(&self, id: Uuid, error: &str) -> Result<()>;

    /// Fetch a job by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<Job>>;
}

/// Repository for uploaded binary objects.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Register a new attachment slot for an upload and return its id.
    async fn create(&self, user_id: Uuid) -> Result<Uuid>;

    /// Store uploaded bytes for a previously created attachment.
    async fn store(&self, id: Uuid, content_type: Option<&str>, data: &[u8]) -> Result<()>;

    /// Read back an attachment's bytes and content type, if it exists and
    /// has been uploaded.
    async fn open(&self, id: Uuid) -> Result<Option<(Vec<u8>, Option<String>)>>;
}

/// Identity provider: maps a bearer token to a stable actor id.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Resolve a token to a user id, or `None` for unknown tokens.
    async fn resolve_token(&self, token: &str) -> Result<Option<Uuid>>;
}

/// Chat-completion backend (system + user message pair in, generated text out).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion. Implementations must return an error rather than
    /// an empty string when the model produces no content.
    async fn chat(&self, system: &str, user: &str) -> Result<String>;
}
