//! In-memory store (for testing)

use std::sync::Mutex;

use crate::{BlockConfig, ConfigStore, StoreError, StoreResult};

/// Keeps the configuration in memory and records every save
#[derive(Default)]
pub struct MemoryConfigStore {
    current: Mutex<Option<BlockConfig>>,
    saves: Mutex<Vec<BlockConfig>>,
    fail_saves: Mutex<bool>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `config` already persisted
    pub fn with_config(config: BlockConfig) -> Self {
        let store = Self::default();
        *store.current.lock().unwrap() = Some(config);
        store
    }

    /// Every configuration passed to a successful `save`, oldest first
    pub fn saves(&self) -> Vec<BlockConfig> {
        self.saves.lock().unwrap().clone()
    }

    /// Make `save` fail until reset
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock().unwrap() = fail;
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> BlockConfig {
        self.current.lock().unwrap().clone().unwrap_or_default()
    }

    fn save(&self, config: &BlockConfig) -> StoreResult<()> {
        if *self.fail_saves.lock().unwrap() {
            return Err(StoreError::Io(std::io::Error::other("Mock save failure")));
        }

        *self.current.lock().unwrap() = Some(config.clone());
        self.saves.lock().unwrap().push(config.clone());
        Ok(())
    }
}
