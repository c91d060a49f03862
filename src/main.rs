use clap::Parser;
use gptapi::utils::error::{ErrorSeverity, GptApiError};
use gptapi::utils::{input::read_prompt, logger, validation::Validate};
use gptapi::{run_until_invalid_json, CliConfig, ConfigStore, GptApi, StopReason};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    let store = ConfigStore::new(&config.base_dir).with_profiles_dir(&config.profiles_dir);

    // A profile that logs to a file takes over the global subscriber.
    let file_logging = match store.load_profile(&config.profile) {
        Ok(profile) if profile.logging.enable => {
            logger::init_file_logger(
                &profile.logging.log_file,
                &profile.logging.log_level,
                profile.logging.json,
            )
            .unwrap_or(false)
        }
        _ => false,
    };
    if !file_logging {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting gptapi with profile '{}'", config.profile);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mut api = GptApi::new(store);
    if let Some(api_base) = &config.api_base {
        api = api.with_api_base(api_base.as_str())?;
    }

    let prompt = match read_prompt(&config.input, config.trim) {
        Ok(prompt) => prompt,
        Err(e) => exit_with(e),
    };

    if config.until_invalid_json {
        let outcome = run_until_invalid_json(
            &api,
            &config.profile,
            &prompt,
            config.max_iterations,
            |iteration, value| {
                println!("Iteration {}: Output is valid JSON.", iteration);
                println!(
                    "{}",
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
                );
            },
        )
        .await;

        match &outcome.stop {
            StopReason::InvalidJson => println!(
                "Stopping at iteration {}. The output is not valid JSON:",
                outcome.iterations
            ),
            StopReason::ApiError(message) => {
                println!("An error occurred. Please check the logs for more details.");
                tracing::error!("JSON loop stopped on API error: {}", message);
            }
            StopReason::IterationLimit => println!(
                "Reached {} iterations without invalid JSON.",
                outcome.iterations
            ),
        }
        println!("Last output before failure:");
        println!("{}", outcome.final_report());
        return Ok(());
    }

    match api.run(&config.profile, &prompt).await {
        Ok(result) => println!("{}", result),
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: GptApiError) -> ! {
    tracing::error!(
        "gptapi failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
