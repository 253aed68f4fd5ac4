use crate::types::{CompletionRequest, CompletionResponse};
use crate::CompletionBackend;
use async_trait::async_trait;
use laponia_models::{ChatError, CompletionsConfig};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for Groq's OpenAI-compatible chat-completions endpoint. Any
/// provider speaking the same protocol works through `base_url`.
pub struct GroqClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: &str, config: &CompletionsConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ChatError::Internal {
                reason: e.to_string(),
            })?;

        Ok(Self {
            api_key: api_key.to_string(),
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Result<HeaderMap, ChatError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
            ChatError::Config {
                reason: "API key contains characters not allowed in a header".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl CompletionBackend for GroqClient {
    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending chat completion request to {}", url);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Completion {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Completion {
                reason: format!("provider error ({status}): {error_text}"),
            });
        }

        let body: CompletionResponse =
            response.json().await.map_err(|e| ChatError::Completion {
                reason: format!("invalid provider response: {e}"),
            })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ChatError::Completion {
                reason: "provider returned no choices".to_string(),
            })
    }
}
