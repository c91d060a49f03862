use crate::core::gptapi::GptApi;

#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// The last output did not parse as JSON.
    InvalidJson,
    /// The API call itself failed; holds the error message.
    ApiError(String),
    IterationLimit,
}

#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// Number of successful API calls.
    pub iterations: usize,
    pub last_output: Option<String>,
    pub stop: StopReason,
}

impl ProbeOutcome {
    /// What to show as the last output: the error message when the API call
    /// failed, otherwise the last result received.
    pub fn final_report(&self) -> &str {
        match &self.stop {
            StopReason::ApiError(message) => message,
            _ => self.last_output.as_deref().unwrap_or(""),
        }
    }
}

/// Repeats the same call until its output stops parsing as JSON, the API
/// fails, or `max_iterations` calls have succeeded.
///
/// Structured results are taken as returned, without schema validation, so
/// malformed function-call arguments end the loop as `InvalidJson`.
/// `on_json` sees every iteration whose output was valid JSON.
pub async fn run_until_invalid_json<F>(
    api: &GptApi,
    profile: &str,
    prompt: &str,
    max_iterations: Option<usize>,
    mut on_json: F,
) -> ProbeOutcome
where
    F: FnMut(usize, &serde_json::Value),
{
    let mut iterations = 0;
    let mut last_output = None;

    loop {
        if max_iterations.is_some_and(|max| iterations >= max) {
            tracing::info!("Stopping after {} iterations without a JSON failure", iterations);
            return ProbeOutcome {
                iterations,
                last_output,
                stop: StopReason::IterationLimit,
            };
        }

        let result = match api.run_raw(profile, prompt).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    "Iteration {}: An error occurred while running the GPT API: {}",
                    iterations,
                    e
                );
                return ProbeOutcome {
                    iterations,
                    last_output,
                    stop: StopReason::ApiError(e.to_string()),
                };
            }
        };
        iterations += 1;
        tracing::info!("Iteration {}: Successfully received result", iterations);

        match serde_json::from_str::<serde_json::Value>(&result) {
            Ok(value) => {
                tracing::info!("Iteration {}: Output is valid JSON", iterations);
                on_json(iterations, &value);
                last_output = Some(result);
            }
            Err(_) => {
                tracing::error!("Iteration {}: Output is not valid JSON. Stopping.", iterations);
                return ProbeOutcome {
                    iterations,
                    last_output: Some(result),
                    stop: StopReason::InvalidJson,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_report_prefers_api_error_message() {
        let outcome = ProbeOutcome {
            iterations: 2,
            last_output: Some("{\"ok\": true}".to_string()),
            stop: StopReason::ApiError("API returned 500: boom".to_string()),
        };
        assert_eq!(outcome.final_report(), "API returned 500: boom");
    }

    #[test]
    fn test_final_report_uses_last_output() {
        let outcome = ProbeOutcome {
            iterations: 1,
            last_output: Some("not json".to_string()),
            stop: StopReason::InvalidJson,
        };
        assert_eq!(outcome.final_report(), "not json");

        let outcome = ProbeOutcome {
            iterations: 0,
            last_output: None,
            stop: StopReason::IterationLimit,
        };
        assert_eq!(outcome.final_report(), "");
    }
}
