//! The request adapter: builds the multimodal prompt, dispatches it through a
//! [`ChatTransport`], and folds the reply into an [`AnalysisOutcome`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::encoder::EncodedImage;
use crate::error::{AnalysisOutcome, AnalyzerError, ErrorKind};
use crate::openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageDetail, ImageUrl,
};

pub const SYSTEM_PROMPT: &str = "You are an expert at analyzing images and identifying objects, \
especially food ingredients. Be thorough and precise in your analysis. Format your response in \
markdown with headings for different sections.";

/// A failed provider round trip, as reported by the transport.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderFailure {
    /// HTTP status, when the provider answered at all.
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn is_credential_problem(&self) -> bool {
        self.status == Some(401) || self.message.to_ascii_lowercase().contains("api key")
    }
}

/// Outbound boundary to the inference provider.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> Result<ChatCompletionResponse, ProviderFailure>;
}

/// Everything needed for one provider call, validated up front.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub prompt_text: String,
    pub image: EncodedImage,
    pub model_name: String,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
}

impl AnalysisRequest {
    pub fn new(image: &EncodedImage, prompt: &str, config: &Config) -> Result<Self, AnalyzerError> {
        if prompt.trim().is_empty() {
            return Err(AnalyzerError::InvalidInput("Prompt must not be empty".into()));
        }
        if image.base64.is_empty() {
            return Err(AnalyzerError::InvalidInput("Image payload is empty".into()));
        }
        if config.max_output_tokens == 0 {
            return Err(AnalyzerError::InvalidInput(
                "Token budget must be greater than zero".into(),
            ));
        }

        Ok(Self {
            prompt_text: prompt.to_string(),
            image: image.clone(),
            model_name: config.model_name.clone(),
            max_output_tokens: config.max_output_tokens,
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn to_chat_request(&self) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model_name.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(vec![
                    ContentPart::Text {
                        text: self.prompt_text.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: self.image.data_url(),
                            detail: ImageDetail::High,
                        },
                    },
                ]),
            ],
            max_tokens: self.max_output_tokens,
        }
    }
}

/// Runs one analysis. Never retries; a missing key returns before any request
/// is built.
pub async fn analyze<T>(
    transport: &T,
    image: &EncodedImage,
    prompt: &str,
    config: &Config,
) -> AnalysisOutcome
where
    T: ChatTransport + ?Sized,
{
    let Some(api_key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        warn!("OPENAI_API_KEY is not set; skipping provider call");
        return AnalyzerError::MissingCredential.into();
    };

    let request = match AnalysisRequest::new(image, prompt, config) {
        Ok(request) => request,
        Err(err) => return err.into(),
    };

    info!(
        model = %request.model_name,
        media_type = %request.image.media_type,
        encoded_len = request.image.base64.len(),
        "analyzing image"
    );

    match transport
        .send(api_key, &request.to_chat_request(), request.timeout())
        .await
    {
        Ok(response) => match response.first_content() {
            Some(text) => {
                info!(chars = text.len(), "analysis complete");
                AnalysisOutcome::success(text)
            }
            None => {
                warn!("provider returned no content");
                AnalyzerError::EmptyResult.into()
            }
        },
        Err(failure) => {
            error!(status = ?failure.status, error = %failure.message, "error analyzing image with provider");
            let kind = if failure.is_credential_problem() {
                ErrorKind::MissingCredential
            } else {
                ErrorKind::ProviderError
            };
            AnalysisOutcome::Failure {
                kind,
                message: failure.message,
            }
        }
    }
}
