//! Core enforcement logic for curfew
//!
//! This crate contains:
//! - The daily block state machine (activate at the cutoff, reset on a new day)
//! - The process enforcer (SIGTERM, grace period, SIGKILL)
//! - The monitor loop that drives both on a fixed cadence

mod block;
mod enforcer;
mod events;
mod monitor;

pub use block::*;
pub use enforcer::*;
pub use events::*;
pub use monitor::*;
