use crate::domain::model::{ChatCompletionRequest, ChatCompletionResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn create_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;
}
