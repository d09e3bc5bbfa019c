//! Persistence layer for curfew
//!
//! Provides:
//! - The block configuration record (target, cutoff, daily block state)
//! - A JSON file store with atomic replace
//! - An in-memory store for tests

mod json;
mod memory;
mod record;
mod traits;

pub use json::*;
pub use memory::*;
pub use record::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
