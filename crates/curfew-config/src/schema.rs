//! Raw settings schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw settings as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Daemon settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,
}

/// Daemon-level settings; every field is optional
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RawDaemonConfig {
    /// Where the block state is persisted
    pub state_file: Option<PathBuf>,

    /// Pause between monitor ticks
    pub tick_interval_ms: Option<u64>,

    /// How long a terminated process gets before it is killed
    pub terminate_timeout_ms: Option<u64>,

    /// Consecutive failed ticks before backing off
    pub failure_threshold: Option<u32>,

    /// Pause between ticks once the failure threshold is reached
    pub failure_backoff_ms: Option<u64>,

    /// How long shutdown waits for the monitor to acknowledge
    pub shutdown_timeout_ms: Option<u64>,
}
