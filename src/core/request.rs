use crate::config::profile::Profile;
use crate::core::tokens::count_message_tokens;
use crate::domain::model::{
    ChatCompletionRequest, ChatMessage, FunctionCallSpec, FunctionDefinition,
};
use crate::utils::error::{GptApiError, Result};

pub const MAX_INPUT_TOKENS: usize = 120_000;
pub const CUTS: u32 = 3;
pub const FORMAT_FUNCTION_NAME: &str = "format_response";
const FORMAT_FUNCTION_DESCRIPTION: &str =
    "Formats the response according to the specified schema.";
const OVERLAP_RATIO: f64 = 0.05;

/// Builds the chat-completion request for a profile and prompt.
///
/// Prompts whose estimated size exceeds `max_input_tokens` are halved with a
/// small overlap, up to `max_cuts` times. Only the first chunk is sent.
pub struct RequestPreparer<'a> {
    profile: &'a Profile,
    prompt: &'a str,
    max_input_tokens: usize,
    max_cuts: u32,
}

/// The two overlapping halves of an oversized prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSplit<'a> {
    pub first: &'a str,
    pub second: &'a str,
}

impl<'a> RequestPreparer<'a> {
    pub fn new(profile: &'a Profile, prompt: &'a str) -> Self {
        Self {
            profile,
            prompt,
            max_input_tokens: MAX_INPUT_TOKENS,
            max_cuts: CUTS,
        }
    }

    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens;
        self
    }

    pub fn with_max_cuts(mut self, max_cuts: u32) -> Self {
        self.max_cuts = max_cuts;
        self
    }

    pub fn prepare(&self) -> Result<ChatCompletionRequest> {
        self.prepare_chunk(self.prompt, 0)
    }

    fn prepare_chunk(&self, prompt: &str, cut_attempt: u32) -> Result<ChatCompletionRequest> {
        let messages = vec![
            ChatMessage::system(self.profile.system_prompt.clone()),
            ChatMessage::user(prompt),
        ];

        let total_tokens = count_message_tokens(&messages);
        tracing::debug!("Total tokens in prepared messages: {}", total_tokens);

        if total_tokens > self.max_input_tokens {
            if cut_attempt >= self.max_cuts {
                tracing::error!("Maximum number of cuts reached. Aborting.");
                return Err(GptApiError::InputTooLarge {
                    tokens: total_tokens,
                    cuts: cut_attempt,
                });
            }
            tracing::debug!(
                "Input token limit exceeded: {} tokens. Attempting to cut input into smaller parts.",
                total_tokens
            );

            let split = split_prompt(prompt);
            tracing::debug!("First cut: '{}...'", preview(split.first));
            tracing::debug!("Second cut: '{}...'", preview(split.second));

            let first = self.prepare_chunk(split.first, cut_attempt + 1)?;
            // both halves must fit, though only the first is sent
            self.prepare_chunk(split.second, cut_attempt + 1)?;
            return Ok(first);
        }

        let params = &self.profile.parameters;
        let mut request = ChatCompletionRequest {
            model: self.profile.model.clone(),
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            n: params.n,
            stop: params.stop.clone(),
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            functions: None,
            function_call: None,
        };

        if let Some(schema) = self.profile.structured_schema() {
            request.functions = Some(vec![FunctionDefinition {
                name: FORMAT_FUNCTION_NAME.to_string(),
                description: FORMAT_FUNCTION_DESCRIPTION.to_string(),
                parameters: schema.clone(),
            }]);
            request.function_call = Some(FunctionCallSpec {
                name: FORMAT_FUNCTION_NAME.to_string(),
            });
        }

        Ok(request)
    }
}

/// Halves `prompt` around its midpoint with a 5% overlap on each side.
/// Positions are counted in characters.
pub fn split_prompt(prompt: &str) -> PromptSplit<'_> {
    let len = prompt.chars().count();
    let midpoint = len / 2;
    let overlap = (len as f64 * OVERLAP_RATIO) as usize;
    let start_cut = midpoint.saturating_sub(overlap);
    let end_cut = (midpoint + overlap).min(len);

    PromptSplit {
        first: &prompt[..byte_offset(prompt, end_cut)],
        second: &prompt[byte_offset(prompt, start_cut)..],
    }
}

fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn preview(s: &str) -> &str {
    &s[..byte_offset(s, 50)]
}
