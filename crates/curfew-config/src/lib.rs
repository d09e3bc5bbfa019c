//! Daemon settings for curfew
//!
//! Supports a small TOML file with:
//! - Versioned schema
//! - Monitor cadence, termination grace period and failure backoff
//! - State file location
//! - Validation with clear error messages
//!
//! The file is optional; [`load_config_or_default`] falls back to defaults
//! when it does not exist.

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate settings from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<DaemonSettings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Like [`load_config`], but a missing file yields default settings
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<DaemonSettings> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DaemonSettings::default()),
        Err(e) => Err(e.into()),
    }
}

/// Parse and validate settings from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<DaemonSettings> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(DaemonSettings::from_raw(raw))
}
