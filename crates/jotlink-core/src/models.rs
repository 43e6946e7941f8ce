//! Data model for notes, threads, messages, jobs, and attachments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Link preview metadata extracted from a URL found in note content.
///
/// Embedded in [`Note`], not a separate entity. Set at most once per
/// extraction run and overwritten by later runs; absence means no URL was
/// detected or extraction found no title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A user-authored text/image note, the primary content unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    /// Owner of the note. Every access-control decision resolves to this.
    pub user_id: Uuid,
    pub content: String,
    /// Reference to an uploaded image attachment, if any.
    pub image_id: Option<Uuid>,
    pub link_metadata: Option<LinkMetadata>,
    /// Bumped on every edit.
    pub updated_time: DateTime<Utc>,
}

/// A note as delivered to the presentation layer, with the image reference
/// resolved into a time-limited signed URL at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub image_url: Option<String>,
}

/// The single conversation container attached to one note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: Uuid,
    pub note_id: Uuid,
}

/// Author of a message: the user or the AI responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Ai,
}

impl MessageType {
    /// String form used in the database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::User => "user",
            MessageType::Ai => "ai",
        }
    }

    /// Parse the database/wire string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(MessageType::User),
            "ai" => Some(MessageType::Ai),
            _ => None,
        }
    }
}

/// One entry in a thread. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub created_time: DateTime<Utc>,
}

/// Kind of deferred job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Fetch link-preview metadata for a URL found in note content.
    LinkPreview,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::LinkPreview => "link_preview",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "link_preview" => Some(JobType::LinkPreview),
            _ => None,
        }
    }
}

/// Lifecycle state of a deferred job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// A deferred one-shot unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub note_id: Option<Uuid>,
    pub job_type: JobType,
    pub status: JobStatus,
    pub payload: Option<JsonValue>,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// An uploaded binary object (note image attachment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub storage_path: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}
