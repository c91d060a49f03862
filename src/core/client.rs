use crate::config::credentials::Credentials;
use crate::domain::model::{ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse};
use crate::domain::ports::CompletionClient;
use crate::utils::error::{GptApiError, Result};
use async_trait::async_trait;
use reqwest::Client;

const CONTEXT_LENGTH_EXCEEDED: &str = "context_length_exceeded";

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_base: &str, credentials: &Credentials) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: credentials.api_key().to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn create_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }
}

fn classify_error(status: u16, body: &str) -> GptApiError {
    let (message, code) = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.code),
        Err(_) => (body.to_string(), None),
    };

    if code.as_deref() == Some(CONTEXT_LENGTH_EXCEEDED) || message.contains(CONTEXT_LENGTH_EXCEEDED)
    {
        tracing::error!("API request failed due to exceeding the token context length.");
        return GptApiError::ContextLengthExceeded { message };
    }

    tracing::error!("Unexpected API error ({}): {}", status, message);
    GptApiError::ApiStatus { status, message }
}
