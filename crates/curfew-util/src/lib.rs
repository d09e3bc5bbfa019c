//! Shared utilities for curfew
//!
//! This crate provides:
//! - Time utilities (local wall clock, daily cutoff type, mock time)
//! - Error types
//! - Default paths for configuration and state, plus path normalization

mod error;
mod paths;
mod time;

pub use error::*;
pub use paths::*;
pub use time::*;
