use thiserror::Error;

#[derive(Error, Debug)]
pub enum GptApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to parse configuration {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("Input too large: {tokens} estimated tokens after {cuts} cuts")]
    InputTooLarge { tokens: usize, cuts: u32 },

    #[error("Token context length exceeded: {message}")]
    ContextLengthExceeded { message: String },

    #[error("API returned {status}: {message}")]
    ApiStatus { status: u16, message: String },

    #[error("Received empty response from API")]
    EmptyResponse,

    #[error("Structured output validation failed: {message}")]
    StructuredOutput { message: String },
}

pub type Result<T> = std::result::Result<T, GptApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Api,
    Response,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GptApiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GptApiError::ConfigParse { .. }
            | GptApiError::MissingConfig { .. }
            | GptApiError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            GptApiError::InputNotFound { .. }
            | GptApiError::InputTooLarge { .. }
            | GptApiError::ContextLengthExceeded { .. } => ErrorCategory::Input,
            GptApiError::Http(_) => ErrorCategory::Network,
            GptApiError::ApiStatus { .. } => ErrorCategory::Api,
            GptApiError::EmptyResponse
            | GptApiError::StructuredOutput { .. }
            | GptApiError::Serialization(_) => ErrorCategory::Response,
            GptApiError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // transient, worth another attempt
            GptApiError::Http(_) | GptApiError::EmptyResponse => ErrorSeverity::Medium,
            GptApiError::ApiStatus { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            GptApiError::Io(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GptApiError::ConfigParse { path, .. } => {
                format!("Failed to load configuration from {}.", path)
            }
            GptApiError::MissingConfig { field } => {
                format!("Configuration is missing '{}'.", field)
            }
            GptApiError::InvalidConfigValue { field, reason, .. } => {
                format!("Configuration value for '{}' is invalid: {}", field, reason)
            }
            GptApiError::InputNotFound { path } => format!("The file {} was not found.", path),
            GptApiError::InputTooLarge { .. } => {
                "Input too large, and maximum cuts exceeded.".to_string()
            }
            GptApiError::ContextLengthExceeded { .. } => {
                "Token context length exceeded. Please adjust the input.".to_string()
            }
            GptApiError::ApiStatus { status, message } => {
                format!("Unexpected API error ({}): {}", status, message)
            }
            GptApiError::EmptyResponse => "Received empty response from API.".to_string(),
            GptApiError::StructuredOutput { .. } => {
                "Validation error. Please check the structured output schema.".to_string()
            }
            GptApiError::Http(_) => {
                "Could not reach the API. Please try again later.".to_string()
            }
            GptApiError::Io(_) | GptApiError::Serialization(_) => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the profile YAML and credentials file for missing or malformed fields"
            }
            ErrorCategory::Input => "Shorten the prompt or check the input file path",
            ErrorCategory::Network => "Check network connectivity and the api_base setting",
            ErrorCategory::Api => "Check the API key, model name and account limits",
            ErrorCategory::Response => {
                "Re-run the request, or relax the structured output schema"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}
