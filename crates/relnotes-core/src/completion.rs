//! Chat completion client for OpenAI-compatible APIs.
//!
//! Requests are blocking. There is no retry, backoff or request timeout; a
//! failed call is returned to the caller as [`ReleaseNotesError::Completion`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::ModelSettings;
use crate::error::{ReleaseNotesError, Result};

/// Something that can turn a conversation into a completion.
pub trait CompletionBackend {
    /// Send `messages` to `model` and return the top completion's text.
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String>;
}

impl<B: CompletionBackend + ?Sized> CompletionBackend for &B {
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        (**self).complete(model, messages)
    }
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions for the model.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: MessageRole,

    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// Model identifier.
    pub model: &'a str,

    /// Conversation messages.
    pub messages: &'a [ChatMessage],
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Unique identifier for this completion.
    #[serde(default)]
    pub id: Option<String>,

    /// Completion choices.
    pub choices: Vec<ChatChoice>,

    /// Token usage information.
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Text of the first choice, if it has any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// Index of this choice.
    #[serde(default)]
    pub index: u32,

    /// The message for this choice.
    pub message: ResponseMessage,

    /// Finish reason (stop, length, etc.).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message in a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Role (always "assistant" for responses).
    pub role: String,

    /// Text content of the response.
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,

    /// Tokens in the completion.
    pub completion_tokens: u32,

    /// Total tokens used.
    pub total_tokens: u32,
}

/// Blocking client for an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiClient {
    /// Create a client from model settings.
    pub fn new(settings: &ModelSettings) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| ReleaseNotesError::Http(e.to_string()))?;

        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            endpoint: completions_endpoint(&settings.base_url),
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

impl CompletionBackend for OpenAiClient {
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest { model, messages };
        trace!("Sending chat request: {:?}", request);

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| ReleaseNotesError::Completion(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(ReleaseNotesError::Completion(format!(
                "API error {}: {}",
                status, text
            )));
        }

        let response: ChatResponse = response.json().map_err(|e| {
            ReleaseNotesError::Completion(format!("Failed to parse response: {}", e))
        })?;

        debug!(
            "Chat response received: {} tokens used",
            response.usage.as_ref().map_or(0, |u| u.total_tokens)
        );

        response
            .content()
            .map(str::to_string)
            .ok_or_else(|| ReleaseNotesError::Completion("No content in response".into()))
    }
}
