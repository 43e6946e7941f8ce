//! Mock chat backend for deterministic testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use jotlink_core::{ChatBackend, Error, Result};

/// One recorded call to the mock backend.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone)]
struct MockConfig {
    fixed_responses: HashMap<String, String>,
    default_response: String,
    fail_with: Option<String>,
    empty_response: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fixed_responses: HashMap::new(),
            default_response: "Mock response".to_string(),
            fail_with: None,
            empty_response: false,
        }
    }
}

/// Mock chat backend with a call log for assertions.
#[derive(Clone)]
pub struct MockChatBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the response returned for any prompt.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Add a response mapping for a specific user prompt.
    pub fn with_response_mapping(
        mut self,
        user_prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .fixed_responses
            .insert(user_prompt.into(), response.into());
        self
    }

    /// Make every call fail with the given message.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).fail_with = Some(message.into());
        self
    }

    /// Simulate a model that returns no content.
    pub fn with_empty_response(mut self) -> Self {
        Arc::make_mut(&mut self.config).empty_response = true;
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for MockChatBackend {
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(MockCall {
            system: system.to_string(),
            user: user.to_string(),
        });

        if let Some(message) = &self.config.fail_with {
            return Err(Error::Inference(message.clone()));
        }
        if self.config.empty_response {
            return Err(Error::Inference("no response from model".to_string()));
        }

        Ok(self
            .config
            .fixed_responses
            .get(user)
            .cloned()
            .unwrap_or_else(|| self.config.default_response.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let backend = MockChatBackend::new().with_fixed_response("hi there");

        let answer = backend.chat("system prompt", "question").await.unwrap();
        assert_eq!(answer, "hi there");
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.calls()[0].system, "system prompt");
    }

    #[tokio::test]
    async fn test_mock_response_mapping() {
        let backend = MockChatBackend::new()
            .with_response_mapping("what is this?", "a note")
            .with_fixed_response("fallback");

        assert_eq!(backend.chat("s", "what is this?").await.unwrap(), "a note");
        assert_eq!(backend.chat("s", "other").await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_mock_failure_mode() {
        let backend = MockChatBackend::new().with_failure("model down");
        let err = backend.chat("s", "q").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert_eq!(backend.call_count(), 1);
    }
}
