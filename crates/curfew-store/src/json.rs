//! JSON file store

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{BlockConfig, ConfigStore, StoreResult, StoredBlockConfig};

/// Stores the block configuration as a pretty-printed JSON file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash never leaves a half-written record behind.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the raw record. `Ok(None)` means nothing has been saved yet.
    pub fn read_stored(&self) -> StoreResult<Option<StoredBlockConfig>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> BlockConfig {
        match self.read_stored() {
            Ok(Some(stored)) => {
                info!(path = %self.path.display(), "Configuration loaded");
                BlockConfig::from_stored(stored)
            }
            Ok(None) => {
                info!(path = %self.path.display(), "No prior configuration found, using defaults");
                BlockConfig::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load configuration, using defaults");
                BlockConfig::default()
            }
        }
    }

    fn save(&self, config: &BlockConfig) -> StoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut json = serde_json::to_string_pretty(&config.to_stored())?;
        json.push('\n');

        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;

        debug!(
            path = %self.path.display(),
            block_active = config.block_active(),
            "Configuration saved"
        );
        Ok(())
    }
}
