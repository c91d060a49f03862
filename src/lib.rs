pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{credentials::Credentials, profile::Profile, store::ConfigStore};
pub use crate::core::{
    client::OpenAiClient,
    gptapi::GptApi,
    probe::{run_until_invalid_json, ProbeOutcome, StopReason},
};
pub use crate::utils::error::{GptApiError, Result};
