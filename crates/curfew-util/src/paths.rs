//! Default paths for curfew components
//!
//! Provides centralized path defaults that all crates can use.
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/curfew/config.toml` or `~/.config/curfew/config.toml`
//! - State: `$XDG_DATA_HOME/curfew/state.json` or `~/.local/share/curfew/state.json`

use std::path::{Component, Path, PathBuf};

/// Environment variable for overriding the data directory
pub const CURFEW_DATA_DIR_ENV: &str = "CURFEW_DATA_DIR";

/// Environment variable for overriding the state file path
pub const CURFEW_STATE_FILE_ENV: &str = "CURFEW_STATE_FILE";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// State filename within the data directory
const STATE_FILENAME: &str = "state.json";

/// Application subdirectory name
const APP_DIR: &str = "curfew";

/// Get the default daemon settings path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/curfew/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/curfew/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$CURFEW_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/curfew` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/curfew` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(CURFEW_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking CURFEW_DATA_DIR env var.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default location of the persisted block state.
pub fn default_state_file() -> PathBuf {
    default_data_dir().join(STATE_FILENAME)
}

/// Normalize an executable path for comparison.
///
/// Symlinks are resolved when the path exists. Otherwise the path is cleaned
/// lexically (`.` dropped, `..` folded into its parent).
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }

    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Last path component, used for human-readable log lines
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
