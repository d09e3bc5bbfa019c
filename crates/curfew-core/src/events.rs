//! Events emitted by the monitor loop

use chrono::NaiveDate;
use curfew_util::WallClock;
use std::path::PathBuf;

use crate::{SweepOutcome, Transition};

/// Observable monitoring state, used for status lines only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    /// No target configured; monitoring cannot start
    Idle,
    /// Target allowed until the cutoff
    Unblocked { cutoff: WallClock },
    /// Target denied for the rest of the day; every tick sweeps
    Blocked,
}

impl MonitorStatus {
    /// Human-readable status line for `target_name`
    pub fn message(&self, target_name: &str) -> String {
        match self {
            MonitorStatus::Idle => "Idle. Configure a target application to start monitoring.".into(),
            MonitorStatus::Unblocked { cutoff } => {
                format!("Monitoring {}. Allowed until {}.", target_name, cutoff)
            }
            MonitorStatus::Blocked => {
                format!("Blocking {}. Access denied until tomorrow.", target_name)
            }
        }
    }
}

/// Events sent from the monitor loop to its owner
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// The loop is running
    Started { target: PathBuf, cutoff: WallClock },

    /// The effective status line changed
    StatusChanged { status: MonitorStatus, message: String },

    /// The block state changed and was handed to the store
    Transition { transition: Transition, date: NaiveDate },

    /// A matching process was dealt with
    ProcessHandled(SweepOutcome),

    /// A tick could not complete; the loop will retry
    TickFailed { error: String, consecutive: u32 },

    /// The block state could not be persisted; it will be retried
    PersistFailed { error: String },

    /// The loop has ended; no further events follow
    Stopped,
}
