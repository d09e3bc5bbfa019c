//! Time utilities for curfew
//!
//! All decisions use the host's local wall clock. The daily cutoff is a
//! [`WallClock`] (hour and minute), compared against the time-of-day of the
//! current local instant.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `CURFEW_MOCK_TIME` environment variable can be set
//! to override the system time for all time-sensitive operations. This is
//! useful for checking cutoff and day-rollover behavior by hand.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 16:59:30`)
//!
//! Example:
//! ```bash
//! CURFEW_MOCK_TIME="2025-12-25 16:59:30" curfewd run
//! ```

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "CURFEW_MOCK_TIME";

/// Format accepted by `CURFEW_MOCK_TIME`
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let mock_time_str = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let Ok(naive_dt) = NaiveDateTime::parse_from_str(&mock_time_str, MOCK_TIME_FORMAT)
            else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    expected_format = MOCK_TIME_FORMAT,
                    "Invalid mock time format"
                );
                return None;
            };

            let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    "Failed to convert mock time to local timezone"
                );
                return None;
            };

            let offset = mock_dt.signed_duration_since(chrono::Local::now());
            tracing::info!(
                mock_time = %mock_time_str,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Current local wall-clock time without a zone attached.
///
/// This is what the block state machine consumes: the cutoff and the block
/// date are both expressed in local wall-clock terms.
pub fn local_now() -> NaiveDateTime {
    now().naive_local()
}

/// Format a timestamp for status lines.
pub fn format_datetime_full(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Error parsing an `HH:MM` clock string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WallClockParseError {
    #[error("expected HH:MM, got '{0}'")]
    Format(String),

    #[error("time out of range: {hour}:{minute:02} (hour 0-23, minute 0-59)")]
    OutOfRange { hour: u32, minute: u32 },
}

/// A time of day with minute resolution, used as the daily cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WallClock {
    hour: u8,
    minute: u8,
}

impl WallClock {
    /// The default cutoff: 17:00
    pub const DEFAULT_CUTOFF: WallClock = WallClock { hour: 17, minute: 0 };

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Returns seconds since midnight
    pub fn as_seconds_from_midnight(&self) -> u32 {
        (self.hour as u32) * 3600 + (self.minute as u32) * 60
    }

    /// True once `dt` is at or past this clock time on its own calendar day
    pub fn has_passed(&self, dt: &NaiveDateTime) -> bool {
        dt.time() >= self.to_naive_time()
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::DEFAULT_CUTOFF
    }
}

impl PartialOrd for WallClock {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WallClock {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_seconds_from_midnight()
            .cmp(&other.as_seconds_from_midnight())
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for WallClock {
    type Err = WallClockParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| WallClockParseError::Format(s.to_string()))?;

        let hour: u32 = h
            .parse()
            .map_err(|_| WallClockParseError::Format(s.to_string()))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| WallClockParseError::Format(s.to_string()))?;

        if hour >= 24 || minute >= 60 {
            return Err(WallClockParseError::OutOfRange { hour, minute });
        }

        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }
}
