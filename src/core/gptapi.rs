use crate::config::credentials::Credentials;
use crate::config::profile::Profile;
use crate::config::store::ConfigStore;
use crate::core::client::OpenAiClient;
use crate::core::request::RequestPreparer;
use crate::core::structured::StructuredOutputModel;
use crate::domain::model::ChatCompletionResponse;
use crate::domain::ports::CompletionClient;
use crate::utils::error::{GptApiError, Result};
use crate::utils::logger;
use crate::utils::validation::{validate_url, Validate};
use std::sync::Arc;

pub type ClientFactory =
    Box<dyn Fn(&str, &Credentials) -> Arc<dyn CompletionClient> + Send + Sync>;

/// Runs prompts through the chat-completion API under named profiles.
pub struct GptApi {
    store: ConfigStore,
    api_base: Option<String>,
    client_factory: ClientFactory,
}

impl GptApi {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            api_base: None,
            client_factory: Box::new(
                |api_base: &str, credentials: &Credentials| -> Arc<dyn CompletionClient> {
                    Arc::new(OpenAiClient::new(api_base, credentials))
                },
            ),
        }
    }

    /// Overrides every profile's `api_base`.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Result<Self> {
        let api_base = api_base.into();
        validate_url("api_base", &api_base)?;
        self.api_base = Some(api_base);
        Ok(self)
    }

    pub fn with_client_factory(mut self, factory: ClientFactory) -> Self {
        self.client_factory = factory;
        self
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Sends `prompt` using `profile_name` and returns the result: the
    /// function-call arguments in structured mode, the message content otherwise.
    /// Structured results are checked against the profile's schema.
    pub async fn run(&self, profile_name: &str, prompt: &str) -> Result<String> {
        let outcome = self.call(profile_name, prompt).await.and_then(|(profile, result)| {
            if let Some(schema) = profile.structured_schema() {
                StructuredOutputModel::from_schema(schema)?.validate(&result)?;
            }
            Ok(result)
        });
        log_failure(profile_name, outcome)
    }

    /// Like [`GptApi::run`], but returns structured arguments exactly as the
    /// API produced them, without schema validation.
    pub async fn run_raw(&self, profile_name: &str, prompt: &str) -> Result<String> {
        let outcome = self.call(profile_name, prompt).await.map(|(_, result)| result);
        log_failure(profile_name, outcome)
    }

    async fn call(&self, profile_name: &str, prompt: &str) -> Result<(Arc<Profile>, String)> {
        let profile = self.store.load_profile(profile_name)?;
        profile.validate()?;

        if profile.logging.enable {
            let installed = logger::init_file_logger(
                &profile.logging.log_file,
                &profile.logging.log_level,
                profile.logging.json,
            )?;
            if installed {
                tracing::debug!("Logging to {}", profile.logging.log_file);
            }
        }

        let credentials = self.store.load_credentials(&profile.credentials_file)?;
        let api_base = self.api_base.as_deref().unwrap_or(&profile.api_base);
        let client = (self.client_factory)(api_base, &credentials);

        let request = RequestPreparer::new(&profile, prompt).prepare()?;
        let response = client.create_completion(&request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        let result = extract_result(&profile, response)?;
        tracing::debug!("API call successful: {}", result);
        Ok((profile, result))
    }
}

fn log_failure(profile_name: &str, outcome: Result<String>) -> Result<String> {
    if let Err(e) = &outcome {
        tracing::error!("gptapi call with profile '{}' failed: {}", profile_name, e);
    }
    outcome
}

fn extract_result(profile: &Profile, response: ChatCompletionResponse) -> Result<String> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(GptApiError::EmptyResponse)?;

    let result = if profile.structured_output_enabled() {
        message.function_call.map(|call| call.arguments)
    } else {
        message.content
    };

    match result {
        Some(text) if !text.is_empty() => Ok(text),
        _ => {
            tracing::error!("Received empty response from API.");
            Err(GptApiError::EmptyResponse)
        }
    }
}
