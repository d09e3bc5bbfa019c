//! The block configuration and its on-disk form

use chrono::NaiveDate;
use curfew_util::WallClock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Date format of `block_date` on disk (ISO-8601 calendar date)
const DATE_FORMAT: &str = "%Y-%m-%d";

/// The persisted unit of truth for the daemon
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockConfig {
    /// Absolute path of the governed executable. None until one is chosen.
    pub target_path: Option<PathBuf>,

    /// Daily instant after which the target may not run
    pub cutoff: WallClock,

    /// Day the block was activated for. The block is active iff this is set.
    pub block_date: Option<NaiveDate>,
}

impl BlockConfig {
    pub fn new(target_path: impl Into<PathBuf>, cutoff: WallClock) -> Self {
        Self {
            target_path: Some(target_path.into()),
            cutoff,
            block_date: None,
        }
    }

    pub fn block_active(&self) -> bool {
        self.block_date.is_some()
    }

    pub fn target(&self) -> Option<&Path> {
        self.target_path.as_deref()
    }

    /// Convert to the on-disk record
    pub fn to_stored(&self) -> StoredBlockConfig {
        StoredBlockConfig {
            target_path: self
                .target_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            cutoff_hour: self.cutoff.hour() as i64,
            cutoff_minute: self.cutoff.minute() as i64,
            block_active: self.block_active(),
            block_date: self
                .block_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }

    /// Convert from the on-disk record, repairing what can be repaired.
    ///
    /// An out-of-range cutoff falls back to the default cutoff. An active
    /// block without a readable date is treated as not blocked.
    pub fn from_stored(stored: StoredBlockConfig) -> Self {
        let target_path = (!stored.target_path.is_empty()).then(|| PathBuf::from(stored.target_path));

        let cutoff = match (
            u8::try_from(stored.cutoff_hour).ok(),
            u8::try_from(stored.cutoff_minute).ok(),
        ) {
            (Some(h), Some(m)) => WallClock::new(h, m),
            _ => None,
        }
        .unwrap_or_else(|| {
            warn!(
                hour = stored.cutoff_hour,
                minute = stored.cutoff_minute,
                default = %WallClock::DEFAULT_CUTOFF,
                "Stored cutoff out of range, using default"
            );
            WallClock::DEFAULT_CUTOFF
        });

        let block_date = match (stored.block_active, stored.block_date) {
            (true, Some(date)) => match NaiveDate::parse_from_str(&date, DATE_FORMAT) {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!(block_date = %date, error = %e, "Malformed block date, treating as not blocked");
                    None
                }
            },
            (true, None) => {
                warn!("Block marked active without a date, treating as not blocked");
                None
            }
            (false, _) => None,
        };

        Self {
            target_path,
            cutoff,
            block_date,
        }
    }
}

/// On-disk JSON record. Every key is optional and defaults individually.
///
/// Files written by the earlier app-blocker layout (`app_path`, `end_hour`,
/// `end_minute`, `block_activated_today`, `date_block_activated`) are read
/// through aliases and rewritten with the current keys on the next save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlockConfig {
    #[serde(default, alias = "app_path")]
    pub target_path: String,

    #[serde(default = "default_cutoff_hour", alias = "end_hour")]
    pub cutoff_hour: i64,

    #[serde(default = "default_cutoff_minute", alias = "end_minute")]
    pub cutoff_minute: i64,

    #[serde(default, alias = "block_activated_today")]
    pub block_active: bool,

    #[serde(default, alias = "date_block_activated")]
    pub block_date: Option<String>,
}

fn default_cutoff_hour() -> i64 {
    WallClock::DEFAULT_CUTOFF.hour() as i64
}

fn default_cutoff_minute() -> i64 {
    WallClock::DEFAULT_CUTOFF.minute() as i64
}
