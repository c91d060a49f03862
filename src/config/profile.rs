use crate::config::substitute_env_vars;
use crate::domain::model::StopSequences;
use crate::utils::error::{GptApiError, Result};
use crate::utils::logger::level_directive;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CREDENTIALS_FILE: &str = "keys.yaml";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// A named request profile, loaded from `profiles/<name>.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub model: String,
    pub system_prompt: String,
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub parameters: Parameters,
    #[serde(default)]
    pub structured_output: Option<StructuredOutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub enable: bool,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable: false,
            log_file: default_log_file(),
            log_level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub n: u32,
    #[serde(default)]
    pub stop: Option<StopSequences>,
    #[serde(default)]
    pub frequency_penalty: f64,
    #[serde(default)]
    pub presence_penalty: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredOutputConfig {
    pub enable: bool,
    #[serde(default)]
    pub schema: serde_json::Value,
}

fn default_credentials_file() -> String {
    DEFAULT_CREDENTIALS_FILE.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_log_file() -> String {
    "logs/gptapi.log".to_string()
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Profile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content, &path.as_ref().display().to_string())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        serde_yaml::from_str(&processed).map_err(|e| GptApiError::ConfigParse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// The schema to enforce, if structured output is switched on.
    pub fn structured_schema(&self) -> Option<&serde_json::Value> {
        self.structured_output
            .as_ref()
            .filter(|s| s.enable)
            .map(|s| &s.schema)
    }

    pub fn structured_output_enabled(&self) -> bool {
        self.structured_schema().is_some()
    }
}

impl Validate for Profile {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("model", &self.model)?;
        validate_non_empty_string("system_prompt", &self.system_prompt)?;
        validate_path("credentials_file", &self.credentials_file)?;
        validate_url("api_base", &self.api_base)?;

        let p = &self.parameters;
        validate_positive_number("parameters.max_tokens", p.max_tokens as usize, 1)?;
        validate_positive_number("parameters.n", p.n as usize, 1)?;
        validate_range("parameters.temperature", p.temperature, 0.0, 2.0)?;
        validate_range("parameters.top_p", p.top_p, 0.0, 1.0)?;
        validate_range("parameters.frequency_penalty", p.frequency_penalty, -2.0, 2.0)?;
        validate_range("parameters.presence_penalty", p.presence_penalty, -2.0, 2.0)?;

        if self.logging.enable {
            validate_path("logging.log_file", &self.logging.log_file)?;
            level_directive(&self.logging.log_level)?;
        }

        if let Some(schema) = self.structured_schema() {
            if !schema.get("properties").is_some_and(|p| p.is_object()) {
                return Err(GptApiError::InvalidConfigValue {
                    field: "structured_output.schema".to_string(),
                    value: schema.to_string(),
                    reason: "Schema must be an object with a 'properties' object".to_string(),
                });
            }
        }

        Ok(())
    }
}
