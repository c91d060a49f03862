use crate::config::substitute_env_vars;
use crate::utils::error::{GptApiError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const CREDENTIALS_KEY: &str = "openai_api";

#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(rename = "openai_api", default)]
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let credentials = Self {
            api_key: api_key.into(),
        };
        credentials.check()?;
        Ok(credentials)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let processed = substitute_env_vars(&content);
        let credentials: Self =
            serde_yaml::from_str(&processed).map_err(|e| GptApiError::ConfigParse {
                path: path.as_ref().display().to_string(),
                message: e.to_string(),
            })?;
        credentials.check()?;
        Ok(credentials)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn check(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(GptApiError::MissingConfig {
                field: CREDENTIALS_KEY.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
