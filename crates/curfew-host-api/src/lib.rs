//! Process host trait interfaces for curfew
//!
//! This crate defines the interface between the enforcement core and the
//! platform's process table. It contains no platform code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
