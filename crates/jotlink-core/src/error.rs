//! Error types for jotlink.

use thiserror::Error;

/// Result type alias using jotlink's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for jotlink operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(uuid::Uuid),

    /// Thread not found
    #[error("Thread not found: {0}")]
    ThreadNotFound(uuid::Uuid),

    /// Chat completion failed or returned nothing usable
    #[error("Inference error: {0}")]
    Inference(String),

    /// Job queue error
    #[error("Job error: {0}")]
    Job(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// No acting identity present
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Identity present but not the owner
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_note_not_found() {
        let id = Uuid::nil();
        let err = Error::NoteNotFound(id);
        assert_eq!(err.to_string(), format!("Note not found: {}", id));
    }

    #[test]
    fn test_error_display_thread_not_found() {
        let id = Uuid::new_v4();
        let err = Error::ThreadNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("missing bearer token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: missing bearer token");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("not the note owner".to_string());
        assert_eq!(err.to_string(), "Forbidden: not the note owner");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("empty response from model".to_string());
        assert_eq!(
            err.to_string(),
            "Inference error: empty response from model"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
