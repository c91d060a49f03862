pub mod client;
pub mod gptapi;
pub mod probe;
pub mod request;
pub mod structured;
pub mod tokens;

pub use crate::domain::model::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
pub use crate::domain::ports::CompletionClient;
pub use crate::utils::error::Result;
