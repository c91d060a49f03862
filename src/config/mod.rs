pub mod credentials;
pub mod profile;
pub mod store;

use regex::Regex;
use std::sync::LazyLock;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_positive_number, validate_profile_name, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Replaces `${VAR}` with the value of the environment variable `VAR`.
/// Unset variables are left untouched.
pub(crate) fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "gptapi")]
#[command(about = "Send a prompt file to a chat-completion API using a YAML profile")]
pub struct CliConfig {
    /// Profile name, resolved as <base-dir>/<profiles-dir>/<profile>.yaml
    #[arg(short, long, default_value = "goalplanner")]
    pub profile: String,

    /// File containing the prompt
    #[arg(short, long, default_value = "./input.txt")]
    pub input: String,

    #[arg(long, default_value = ".")]
    pub base_dir: String,

    #[arg(long, default_value = store::PROFILES_DIR)]
    pub profiles_dir: String,

    /// Override the profile's api_base
    #[arg(long)]
    pub api_base: Option<String>,

    /// Strip leading and trailing whitespace from the prompt
    #[arg(long)]
    pub trim: bool,

    /// Repeat the call until the output is no longer valid JSON
    #[arg(long)]
    pub until_invalid_json: bool,

    /// Upper bound on iterations for --until-invalid-json
    #[arg(long)]
    pub max_iterations: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_profile_name("profile", &self.profile)?;
        crate::utils::validation::validate_path("input", &self.input)?;
        crate::utils::validation::validate_path("base_dir", &self.base_dir)?;
        if let Some(api_base) = &self.api_base {
            validate_url("api_base", api_base)?;
        }
        if let Some(max) = self.max_iterations {
            validate_positive_number("max_iterations", max, 1)?;
        }
        Ok(())
    }
}
