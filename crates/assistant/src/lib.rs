//! Completion backend for AeosGPT conversations.
//!
//! The API layer only sees [`CompletionProvider`]. [`OpenAiCompatible`] talks
//! to any server exposing `POST {base_url}/chat/completions`.

use std::time::Duration;

use aeos_config::AssistantConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("missing API key for the completion backend")]
    ApiKeyMissing,
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion backend returned no choices")]
    EmptyResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One earlier prompt/answer pair, replayed as context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub prompt: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub history: Vec<Exchange>,
    pub prompt: String,
}

impl CompletionRequest {
    /// Flatten into the message list sent to the backend.
    pub fn to_messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() * 2 + 2);
        if !system_prompt.trim().is_empty() {
            messages.push(ChatMessage::new(Role::System, system_prompt));
        }
        for exchange in &self.history {
            messages.push(ChatMessage::new(Role::User, exchange.prompt.clone()));
            messages.push(ChatMessage::new(Role::Assistant, exchange.answer.clone()));
        }
        messages.push(ChatMessage::new(Role::User, self.prompt.clone()));
        messages
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub model: String,
}

#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, AssistantError>;

    fn model(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatible {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    system_prompt: String,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatible {
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AssistantError::ApiKeyMissing)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            system_prompt: config.system_prompt.clone(),
        })
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiCompatible {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, AssistantError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionBody {
            model: &self.model,
            messages: request.to_messages(&self.system_prompt),
        };

        debug!(model = %self.model, turns = body.messages.len(), "requesting completion");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "completion backend rejected request");
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AssistantError::EmptyResponse)?;

        Ok(Completion {
            content,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
