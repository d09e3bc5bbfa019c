//! Process host traits

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors from process host operations
#[derive(Debug, Error)]
pub enum HostError {
    /// The process no longer exists
    #[error("Process {0} not found")]
    NotFound(u32),

    /// The caller lacks the privilege to signal or inspect the process
    #[error("Permission denied for process {0}")]
    PermissionDenied(u32),

    /// The process table could not be read
    #[error("Process enumeration failed: {0}")]
    Enumeration(String),

    #[error("Signal delivery failed: {0}")]
    Signal(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// One entry of the process table, valid for a single sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,

    /// Resolved absolute path of the running executable.
    /// `None` when the host cannot read it (kernel threads, other users' processes).
    pub exe_path: Option<PathBuf>,

    /// Short process name as reported by the host
    pub name: String,
}

impl ProcessRecord {
    pub fn new(pid: u32, exe_path: Option<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            pid,
            exe_path,
            name: name.into(),
        }
    }
}

/// Process host trait - implemented by platform-specific adapters
#[async_trait]
pub trait ProcessHost: Send + Sync {
    /// List every process visible to this host
    async fn enumerate(&self) -> HostResult<Vec<ProcessRecord>>;

    /// Ask a process to exit (SIGTERM on Unix)
    async fn terminate(&self, pid: u32) -> HostResult<()>;

    /// Force a process to exit (SIGKILL on Unix)
    async fn kill(&self, pid: u32) -> HostResult<()>;

    /// Wait up to `timeout` for a process to exit.
    /// Returns `true` if it is gone, `false` if it is still running.
    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> HostResult<bool>;
}
