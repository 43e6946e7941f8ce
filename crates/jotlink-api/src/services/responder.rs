//! AI responder: answers a question about a note inside its thread.
//!
//! Step ordering is load-bearing. The question is persisted through the
//! trusted message path before anything that can fail, so a vanished note or
//! a model outage still leaves the user's question in the thread. There is no
//! rollback.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use jotlink_core::{
    ChatBackend, Error, MessageRepository, MessageType, NoteRepository, Result,
};
use uuid::Uuid;

/// Answers questions about a note by grounding the chat model in the note
/// content. Ownership checks happen in the HTTP layer before this runs.
pub struct AiResponder {
    notes: Arc<dyn NoteRepository>,
    messages: Arc<dyn MessageRepository>,
    backend: Arc<dyn ChatBackend>,
}

impl AiResponder {
    /// Create a new responder over the given repositories and chat backend.
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        messages: Arc<dyn MessageRepository>,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            notes,
            messages,
            backend,
        }
    }

    /// Persist the question, generate an answer grounded in the note, and
    /// persist the answer as an `ai` message. Returns the answer text.
    pub async fn ask(&self, thread_id: Uuid, note_id: Uuid, question: &str) -> Result<String> {
        let start = Instant::now();

        // The question goes in first and stays even if a later step fails.
        self.messages
            .insert(thread_id, question, MessageType::User)
            .await?;

        let note = self
            .notes
            .fetch(note_id)
            .await?
            .ok_or(Error::NoteNotFound(note_id))?;

        let system = format!(
            "You are a helpful AI assistant. The user is asking about this note: \"{}\"",
            note.content
        );

        debug!(
            subsystem = "inference",
            component = "responder",
            thread_id = %thread_id,
            note_id = %note_id,
            "Requesting completion"
        );

        let answer = self.backend.chat(&system, question).await?;

        self.messages
            .insert(thread_id, &answer, MessageType::Ai)
            .await?;

        info!(
            subsystem = "inference",
            component = "responder",
            thread_id = %thread_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Answer persisted"
        );

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use jotlink_core::{CreateNoteRequest, LinkMetadata, Message, Note};
    use jotlink_inference::mock::MockChatBackend;

    struct FakeNotes {
        notes: HashMap<Uuid, Note>,
    }

    impl FakeNotes {
        fn with_note(id: Uuid, content: &str) -> Self {
            let note = Note {
                id,
                user_id: Uuid::new_v4(),
                content: content.to_string(),
                image_id: None,
                link_metadata: None,
                updated_time: Utc::now(),
            };
            Self {
                notes: HashMap::from([(id, note)]),
            }
        }

        fn empty() -> Self {
            Self {
                notes: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl NoteRepository for FakeNotes {
        async fn insert(&self, _req: CreateNoteRequest) -> Result<Uuid> {
            unimplemented!()
        }

        async fn update(&self, _id: Uuid, _content: &str, _image_id: Option<Uuid>) -> Result<()> {
            unimplemented!()
        }

        async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
            Ok(self.notes.get(&id).cloned())
        }

        async fn list(&self, _user_id: Uuid) -> Result<Vec<Note>> {
            unimplemented!()
        }

        async fn delete(&self, _id: Uuid) -> Result<()> {
            unimplemented!()
        }

        async fn update_link_metadata(&self, _id: Uuid, _metadata: &LinkMetadata) -> Result<()> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct FakeMessages {
        log: Mutex<Vec<(Uuid, String, MessageType)>>,
    }

    impl FakeMessages {
        fn entries(&self) -> Vec<(Uuid, String, MessageType)> {
            self.log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageRepository for FakeMessages {
        async fn insert(
            &self,
            thread_id: Uuid,
            content: &str,
            message_type: MessageType,
        ) -> Result<Uuid> {
            self.log
                .lock()
                .unwrap()
                .push((thread_id, content.to_string(), message_type));
            Ok(Uuid::new_v4())
        }

        async fn list(&self, _thread_id: Uuid) -> Result<Vec<Message>> {
            Ok(Vec::new())
        }
    }

    fn responder(
        notes: FakeNotes,
        backend: MockChatBackend,
    ) -> (AiResponder, Arc<FakeMessages>) {
        let messages = Arc::new(FakeMessages::default());
        let responder = AiResponder::new(
            Arc::new(notes),
            messages.clone(),
            Arc::new(backend),
        );
        (responder, messages)
    }

    #[tokio::test]
    async fn test_question_then_answer_persisted_in_order() {
        let note_id = Uuid::new_v4();
        let thread_id = Uuid::new_v4();
        let backend = MockChatBackend::new().with_fixed_response("It is about pelicans.");
        let (responder, messages) = responder(FakeNotes::with_note(note_id, "pelican facts"), backend);

        let answer = responder
            .ask(thread_id, note_id, "what is this note about?")
            .await
            .unwrap();
        assert_eq!(answer, "It is about pelicans.");

        let entries = messages.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].1, "what is this note about?");
        assert_eq!(entries[0].2, MessageType::User);
        assert_eq!(entries[1].1, "It is about pelicans.");
        assert_eq!(entries[1].2, MessageType::Ai);
        assert!(entries.iter().all(|(t, _, _)| *t == thread_id));
    }

    #[tokio::test]
    async fn test_system_prompt_embeds_note_content() {
        let note_id = Uuid::new_v4();
        let backend = MockChatBackend::new();
        let (responder, _messages) = responder(
            FakeNotes::with_note(note_id, "grocery list: eggs, milk"),
            backend.clone(),
        );

        responder
            .ask(Uuid::new_v4(), note_id, "what should I buy?")
            .await
            .unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].system,
            "You are a helpful AI assistant. The user is asking about this note: \"grocery list: eggs, milk\""
        );
        assert_eq!(calls[0].user, "what should I buy?");
    }

    #[tokio::test]
    async fn test_missing_note_fails_but_keeps_question() {
        let backend = MockChatBackend::new();
        let (responder, messages) = responder(FakeNotes::empty(), backend.clone());
        let thread_id = Uuid::new_v4();

        let err = responder
            .ask(thread_id, Uuid::new_v4(), "anyone home?")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoteNotFound(_)));

        // The model is never consulted, yet the question is already stored.
        assert_eq!(backend.call_count(), 0);
        let entries = messages.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, "anyone home?");
        assert_eq!(entries[0].2, MessageType::User);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_question_only() {
        let note_id = Uuid::new_v4();
        let backend = MockChatBackend::new().with_failure("model down");
        let (responder, messages) = responder(FakeNotes::with_note(note_id, "note"), backend);

        let err = responder
            .ask(Uuid::new_v4(), note_id, "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));

        let entries = messages.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].2, MessageType::User);
    }

    #[tokio::test]
    async fn test_empty_model_output_is_an_error() {
        let note_id = Uuid::new_v4();
        let backend = MockChatBackend::new().with_empty_response();
        let (responder, messages) = responder(FakeNotes::with_note(note_id, "note"), backend);

        let err = responder
            .ask(Uuid::new_v4(), note_id, "q")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert_eq!(messages.entries().len(), 1);
    }
}
