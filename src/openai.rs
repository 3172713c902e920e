//! OpenAI chat-completions wire format and the HTTP transport that speaks it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::{ChatTransport, ProviderFailure};

const BODY_LOG_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
    pub detail: ImageDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    High,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// A response carrying a single choice with `text` as its content.
    pub fn with_content(text: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: AssistantMessage {
                    content: Some(text.into()),
                },
            }],
        }
    }

    /// Text of the first choice, if it has any non-whitespace content.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Talks to an OpenAI-compatible `/chat/completions` endpoint over HTTPS.
#[derive(Debug, Clone)]
pub struct OpenAiTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiTransport {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    async fn send(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> Result<ChatCompletionResponse, ProviderFailure> {
        debug!(endpoint = %self.endpoint, model = %request.model, "sending request to provider");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        debug!(%status, body = %excerpt(&body, BODY_LOG_LIMIT), "provider responded");

        if !status.is_success() {
            return Err(failure_from_body(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderFailure::new(Some(status.as_u16()), format!("Malformed provider response: {e}"))
        })
    }
}

impl From<reqwest::Error> for ProviderFailure {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Request to provider timed out: {err}")
        } else {
            err.to_string()
        };
        ProviderFailure::new(err.status().map(|s| s.as_u16()), message)
    }
}

fn failure_from_body(status: u16, body: &str) -> ProviderFailure {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => format!("API Error {status}: {}", excerpt(body, BODY_LOG_LIMIT)),
    };
    ProviderFailure::new(Some(status), message)
}

fn excerpt(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
