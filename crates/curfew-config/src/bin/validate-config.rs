//! Settings validation CLI tool
//!
//! Validates a curfewd settings file and reports any errors.

use curfew_util::{default_config_path, default_state_file};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a curfewd settings file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match curfew_config::load_config(&config_path) {
        Ok(settings) => {
            let state_file = settings.state_file.clone().unwrap_or_else(default_state_file);

            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", curfew_config::CURRENT_CONFIG_VERSION);
            println!("  State file: {}", state_file.display());
            println!("  Tick interval: {} ms", settings.tick_interval.as_millis());
            println!("  Terminate timeout: {} ms", settings.terminate_timeout.as_millis());
            println!(
                "  Failure backoff: {} ms after {} failed ticks",
                settings.failure_backoff.as_millis(),
                settings.failure_threshold
            );
            println!("  Shutdown timeout: {} ms", settings.shutdown_timeout.as_millis());

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                curfew_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                curfew_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                curfew_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                curfew_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        curfew_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
