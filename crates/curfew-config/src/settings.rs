//! Validated daemon settings

use crate::schema::RawConfig;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_TERMINATE_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_FAILURE_BACKOFF_MS: u64 = 5_000;
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 2_000;

/// Validated settings ready for use by the daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonSettings {
    /// State file override. None means the default data directory.
    pub state_file: Option<PathBuf>,

    /// Pause between monitor ticks
    pub tick_interval: Duration,

    /// Grace period between SIGTERM and SIGKILL
    pub terminate_timeout: Duration,

    /// Consecutive failed ticks before the loop slows down
    pub failure_threshold: u32,

    /// Pause between ticks after repeated failures
    pub failure_backoff: Duration,

    /// Bounded wait for the monitor's stop acknowledgment
    pub shutdown_timeout: Duration,
}

impl DaemonSettings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let daemon = raw.daemon;
        Self {
            state_file: daemon.state_file,
            tick_interval: millis(daemon.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS),
            terminate_timeout: millis(
                daemon.terminate_timeout_ms,
                DEFAULT_TERMINATE_TIMEOUT_MS,
            ),
            failure_threshold: daemon
                .failure_threshold
                .unwrap_or(DEFAULT_FAILURE_THRESHOLD),
            failure_backoff: millis(daemon.failure_backoff_ms, DEFAULT_FAILURE_BACKOFF_MS),
            shutdown_timeout: millis(daemon.shutdown_timeout_ms, DEFAULT_SHUTDOWN_TIMEOUT_MS),
        }
    }
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            state_file: None,
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            terminate_timeout: Duration::from_millis(DEFAULT_TERMINATE_TIMEOUT_MS),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            failure_backoff: Duration::from_millis(DEFAULT_FAILURE_BACKOFF_MS),
            shutdown_timeout: Duration::from_millis(DEFAULT_SHUTDOWN_TIMEOUT_MS),
        }
    }
}

fn millis(value: Option<u64>, default: u64) -> Duration {
    Duration::from_millis(value.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawDaemonConfig;

    #[test]
    fn empty_daemon_section_uses_defaults() {
        let settings = DaemonSettings::from_raw(RawConfig {
            config_version: 1,
            daemon: RawDaemonConfig::default(),
        });
        assert_eq!(settings, DaemonSettings::default());
    }

    #[test]
    fn overrides_are_applied() {
        let settings = DaemonSettings::from_raw(RawConfig {
            config_version: 1,
            daemon: RawDaemonConfig {
                state_file: Some(PathBuf::from("/var/lib/curfew/state.json")),
                tick_interval_ms: Some(250),
                failure_backoff_ms: Some(10_000),
                ..Default::default()
            },
        });

        assert_eq!(settings.state_file, Some(PathBuf::from("/var/lib/curfew/state.json")));
        assert_eq!(settings.tick_interval, Duration::from_millis(250));
        assert_eq!(settings.failure_backoff, Duration::from_secs(10));
        assert_eq!(settings.terminate_timeout, Duration::from_secs(1));
        assert_eq!(settings.failure_threshold, 3);
    }
}
