//! Process table access through procfs

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use curfew_host_api::{HostError, HostResult, ProcessRecord};

/// Default procfs mount point
pub const PROC_ROOT: &str = "/proc";

/// Suffix the kernel appends to `/proc/<pid>/exe` when the binary was replaced or removed
const DELETED_SUFFIX: &str = " (deleted)";

/// Read every numeric entry under `proc_root` into a [`ProcessRecord`].
///
/// Processes that exit while the table is being read are skipped. An
/// unreadable `exe` link (kernel threads, other users' processes) yields a
/// record with no executable path.
pub fn list_processes(proc_root: &Path) -> HostResult<Vec<ProcessRecord>> {
    let entries = std::fs::read_dir(proc_root).map_err(|e| {
        HostError::Enumeration(format!("Failed to read {}: {}", proc_root.display(), e))
    })?;

    let mut records = Vec::new();
    for entry in entries.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };

        let dir = entry.path();
        let Ok(comm) = std::fs::read_to_string(dir.join("comm")) else {
            trace!(pid, "Process vanished during enumeration");
            continue;
        };

        let exe_path = std::fs::read_link(dir.join("exe")).ok().map(clean_exe_path);
        records.push(ProcessRecord::new(pid, exe_path, comm.trim_end()));
    }

    debug!(count = records.len(), "Process table read");
    Ok(records)
}

/// Strip the kernel's ` (deleted)` marker so a binary replaced in place still matches
pub fn clean_exe_path(path: PathBuf) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_suffix(DELETED_SUFFIX)) {
        Some(stripped) => PathBuf::from(stripped),
        None => path,
    }
}

/// Send `sig` to a single process
pub fn signal_process(pid: u32, sig: Signal) -> HostResult<()> {
    let raw = i32::try_from(pid)
        .map_err(|_| HostError::Internal(format!("Pid {} out of range", pid)))?;

    match signal::kill(Pid::from_raw(raw), sig) {
        Ok(()) => {
            debug!(pid, signal = ?sig, "Signal sent");
            Ok(())
        }
        Err(Errno::ESRCH) => Err(HostError::NotFound(pid)),
        Err(Errno::EPERM) => Err(HostError::PermissionDenied(pid)),
        Err(e) => Err(HostError::Signal(format!(
            "Failed to send {:?} to {}: {}",
            sig, pid, e
        ))),
    }
}

/// Whether `pid` still exists and has not exited.
///
/// Zombies count as exited: their executable is no longer running and only
/// the parent can reap them.
pub fn is_running(proc_root: &Path, pid: u32) -> bool {
    let Ok(stat) = std::fs::read_to_string(proc_root.join(pid.to_string()).join("stat")) else {
        return false;
    };

    // Field 3 follows the parenthesised comm, which may itself contain spaces or ')'
    let state = stat
        .rfind(')')
        .and_then(|idx| stat[idx + 1..].split_whitespace().next());

    !matches!(state, Some("Z") | Some("X") | Some("x") | None)
}
