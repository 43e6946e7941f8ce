//! OpenAI-compatible chat backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use jotlink_core::{defaults, ChatBackend, Error, Result};

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = defaults::OPENAI_BASE_URL;

/// Default chat model.
pub const DEFAULT_MODEL: &str = defaults::CHAT_MODEL;

/// Timeout for completion requests (seconds).
pub const CHAT_TIMEOUT_SECS: u64 = defaults::CHAT_TIMEOUT_SECS;

/// OpenAI-compatible chat-completion backend.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiBackend {
    /// Create a new backend with explicit configuration.
    pub fn with_config(base_url: String, api_key: String, model: String) -> Result<Self> {
        let timeout = std::env::var("JOTLINK_CHAT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(CHAT_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            model = %model,
            "Initializing chat backend: url={}",
            base_url
        );

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    /// Create from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
    /// | `OPENAI_API_KEY`  | required |
    /// | `JOTLINK_CHAT_MODEL` | `gpt-4.1-nano` |
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Config("OPENAI_API_KEY is not set".to_string()))?;
        let model =
            std::env::var("JOTLINK_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self::with_config(base_url, api_key, model)
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let start = Instant::now();

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "completion API returned {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("malformed completion response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::Inference("no response from model".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "openai",
            model = %self.model,
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = content.len(),
            "Chat completion finished"
        );

        Ok(content)
    }
}
