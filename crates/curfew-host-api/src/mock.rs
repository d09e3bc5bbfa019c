//! Mock process host for testing

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{HostError, HostResult, ProcessHost, ProcessRecord};

/// How a mock process reacts to signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockExit {
    /// Exits on the graceful request
    OnTerminate,
    /// Ignores the graceful request, exits on kill
    OnKill,
    /// Is listed, but gone by the time it is signalled
    Vanish,
    /// Belongs to someone else; every signal is refused
    Protected,
}

#[derive(Debug, Clone)]
struct MockProcess {
    record: ProcessRecord,
    exit: MockExit,
    running: bool,
}

/// Mock process host for unit/integration testing
pub struct MockProcessHost {
    processes: Arc<Mutex<BTreeMap<u32, MockProcess>>>,
    terminate_calls: Arc<Mutex<Vec<u32>>>,
    kill_calls: Arc<Mutex<Vec<u32>>>,
    enumerate_calls: Arc<Mutex<u32>>,

    /// Number of upcoming `enumerate` calls that fail
    fail_enumerations: Arc<Mutex<u32>>,
}

impl MockProcessHost {
    pub fn new() -> Self {
        Self {
            processes: Arc::new(Mutex::new(BTreeMap::new())),
            terminate_calls: Arc::new(Mutex::new(Vec::new())),
            kill_calls: Arc::new(Mutex::new(Vec::new())),
            enumerate_calls: Arc::new(Mutex::new(0)),
            fail_enumerations: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a running process to the fake process table
    pub fn spawn(&self, pid: u32, exe: impl Into<PathBuf>, exit: MockExit) {
        let exe = exe.into();
        let name = exe
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.processes.lock().unwrap().insert(
            pid,
            MockProcess {
                record: ProcessRecord::new(pid, Some(exe), name),
                exit,
                running: true,
            },
        );
    }

    /// Add a process whose executable path cannot be read
    pub fn spawn_unreadable(&self, pid: u32, name: &str) {
        self.processes.lock().unwrap().insert(
            pid,
            MockProcess {
                record: ProcessRecord::new(pid, None, name),
                exit: MockExit::Protected,
                running: true,
            },
        );
    }

    pub fn is_running(&self, pid: u32) -> bool {
        self.processes
            .lock()
            .unwrap()
            .get(&pid)
            .is_some_and(|p| p.running)
    }

    /// Pids passed to `terminate`, in call order
    pub fn terminate_calls(&self) -> Vec<u32> {
        self.terminate_calls.lock().unwrap().clone()
    }

    /// Pids passed to `kill`, in call order
    pub fn kill_calls(&self) -> Vec<u32> {
        self.kill_calls.lock().unwrap().clone()
    }

    pub fn enumerate_calls(&self) -> u32 {
        *self.enumerate_calls.lock().unwrap()
    }

    /// Make the next `count` enumerations fail
    pub fn fail_next_enumerations(&self, count: u32) {
        *self.fail_enumerations.lock().unwrap() = count;
    }
}

impl Default for MockProcessHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessHost for MockProcessHost {
    async fn enumerate(&self) -> HostResult<Vec<ProcessRecord>> {
        *self.enumerate_calls.lock().unwrap() += 1;

        {
            let mut failures = self.fail_enumerations.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(HostError::Enumeration("Mock enumeration failure".into()));
            }
        }

        Ok(self
            .processes
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.running)
            .map(|p| p.record.clone())
            .collect())
    }

    async fn terminate(&self, pid: u32) -> HostResult<()> {
        self.terminate_calls.lock().unwrap().push(pid);

        let mut processes = self.processes.lock().unwrap();
        let Some(process) = processes.get_mut(&pid).filter(|p| p.running) else {
            return Err(HostError::NotFound(pid));
        };

        match process.exit {
            MockExit::OnTerminate => {
                process.running = false;
                Ok(())
            }
            MockExit::OnKill => Ok(()),
            MockExit::Vanish => {
                process.running = false;
                Err(HostError::NotFound(pid))
            }
            MockExit::Protected => Err(HostError::PermissionDenied(pid)),
        }
    }

    async fn kill(&self, pid: u32) -> HostResult<()> {
        self.kill_calls.lock().unwrap().push(pid);

        let mut processes = self.processes.lock().unwrap();
        let Some(process) = processes.get_mut(&pid).filter(|p| p.running) else {
            return Err(HostError::NotFound(pid));
        };

        if process.exit == MockExit::Protected {
            return Err(HostError::PermissionDenied(pid));
        }

        process.running = false;
        Ok(())
    }

    async fn wait_for_exit(&self, pid: u32, _timeout: Duration) -> HostResult<bool> {
        Ok(!self.is_running(pid))
    }
}
