//! Linux process host implementation

use async_trait::async_trait;
use curfew_host_api::{HostError, HostResult, ProcessHost, ProcessRecord};
use nix::sys::signal::Signal;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::process::{is_running, list_processes, signal_process, PROC_ROOT};

/// How often `wait_for_exit` re-checks the process
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Linux process host backed by procfs and kill(2)
pub struct LinuxProcessHost {
    proc_root: PathBuf,
}

impl LinuxProcessHost {
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from(PROC_ROOT),
        }
    }

    /// Read processes from a different procfs mount (containers, tests)
    pub fn with_proc_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }
}

impl Default for LinuxProcessHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessHost for LinuxProcessHost {
    async fn enumerate(&self) -> HostResult<Vec<ProcessRecord>> {
        let proc_root = self.proc_root.clone();

        // A busy process table can take a while to walk
        tokio::task::spawn_blocking(move || list_processes(&proc_root))
            .await
            .map_err(|e| HostError::Internal(format!("Enumeration task failed: {}", e)))?
    }

    async fn terminate(&self, pid: u32) -> HostResult<()> {
        signal_process(pid, Signal::SIGTERM)
    }

    async fn kill(&self, pid: u32) -> HostResult<()> {
        signal_process(pid, Signal::SIGKILL)
    }

    async fn wait_for_exit(&self, pid: u32, timeout: Duration) -> HostResult<bool> {
        let start = Instant::now();
        loop {
            if !is_running(&self.proc_root, pid) {
                debug!(pid, elapsed_ms = start.elapsed().as_millis() as u64, "Process exited");
                return Ok(true);
            }

            if start.elapsed() >= timeout {
                return Ok(false);
            }

            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }
}
