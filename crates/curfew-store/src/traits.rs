//! Store trait definitions

use crate::{BlockConfig, StoreResult};

/// Durable holder of the block configuration
pub trait ConfigStore: Send + Sync {
    /// Load the persisted configuration.
    ///
    /// Never fails: missing or corrupt storage yields
    /// [`BlockConfig::default`], with the cause logged.
    fn load(&self) -> BlockConfig;

    /// Persist the configuration, replacing what was stored
    fn save(&self, config: &BlockConfig) -> StoreResult<()>;
}
