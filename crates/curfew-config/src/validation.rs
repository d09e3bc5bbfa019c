//! Settings validation

use crate::schema::{RawConfig, RawDaemonConfig};
use crate::settings::{DEFAULT_FAILURE_BACKOFF_MS, DEFAULT_TICK_INTERVAL_MS};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("failure_backoff_ms ({backoff}) must not be shorter than tick_interval_ms ({tick})")]
    BackoffShorterThanTick { backoff: u64, tick: u64 },

    #[error("state_file must not be empty")]
    EmptyStateFile,
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    validate_daemon(&config.daemon)
}

fn validate_daemon(daemon: &RawDaemonConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let positive = [
        ("tick_interval_ms", daemon.tick_interval_ms),
        ("terminate_timeout_ms", daemon.terminate_timeout_ms),
        ("failure_backoff_ms", daemon.failure_backoff_ms),
        ("shutdown_timeout_ms", daemon.shutdown_timeout_ms),
        ("failure_threshold", daemon.failure_threshold.map(u64::from)),
    ];
    for (field, value) in positive {
        if value == Some(0) {
            errors.push(ValidationError::MustBePositive { field });
        }
    }

    let tick = daemon.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS);
    let backoff = daemon.failure_backoff_ms.unwrap_or(DEFAULT_FAILURE_BACKOFF_MS);
    if tick > 0 && backoff > 0 && backoff < tick {
        errors.push(ValidationError::BackoffShorterThanTick { backoff, tick });
    }

    if daemon
        .state_file
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        errors.push(ValidationError::EmptyStateFile);
    }

    errors
}
