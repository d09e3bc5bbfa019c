//! Linux process host for curfew
//!
//! Provides:
//! - Process enumeration from procfs with resolved executable paths
//! - Graceful (SIGTERM) and forceful (SIGKILL) termination
//! - Exit observation by polling

mod adapter;
mod process;

pub use adapter::*;
pub use process::*;
