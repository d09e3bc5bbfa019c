//! Process enforcement: find instances of the target and stop them

use curfew_host_api::{HostError, HostResult, ProcessHost};
use curfew_util::normalize_path;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What happened to one matching process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// Exited within the grace period after SIGTERM
    TerminatedGracefully,
    /// Still alive after the grace period and was killed
    ForceKilled,
    /// Gone before it could be signalled
    Vanished,
    /// The daemon may not signal this process
    PermissionDenied,
    /// Any other signalling failure
    Failed(String),
}

/// Outcome for one matching process in a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepOutcome {
    pub pid: u32,
    pub name: String,
    pub outcome: TerminationOutcome,
}

/// Scans the process table and stops every instance of the target.
///
/// Matching is by executable path, never by pid: every sweep enumerates from
/// scratch, so relaunched instances are caught on the next sweep.
pub struct ProcessEnforcer {
    host: Arc<dyn ProcessHost>,
    grace_timeout: Duration,
    /// Pids already reported as untouchable; pruned when they disappear
    denied_reported: HashSet<u32>,
}

impl ProcessEnforcer {
    pub fn new(host: Arc<dyn ProcessHost>, grace_timeout: Duration) -> Self {
        Self {
            host,
            grace_timeout,
            denied_reported: HashSet::new(),
        }
    }

    /// Stop every running instance of `target`.
    ///
    /// Only a failure to read the process table is an error. Per-process
    /// failures are reported in the outcomes and never abort the sweep.
    pub async fn sweep(&mut self, target: &Path) -> HostResult<Vec<SweepOutcome>> {
        let target = normalize_path(target);
        let records = self.host.enumerate().await?;

        let matches: Vec<_> = records
            .into_iter()
            .filter(|r| r.exe_path.as_deref() == Some(target.as_path()))
            .collect();

        let mut outcomes = Vec::with_capacity(matches.len());
        for record in &matches {
            if !self.denied_reported.contains(&record.pid) {
                info!(pid = record.pid, name = %record.name, "Found running instance, terminating");
            }

            let outcome = self.stop_process(record.pid).await;
            self.report(record.pid, &record.name, &outcome);
            outcomes.push(SweepOutcome {
                pid: record.pid,
                name: record.name.clone(),
                outcome,
            });
        }

        self.denied_reported
            .retain(|pid| matches.iter().any(|r| r.pid == *pid));

        Ok(outcomes)
    }

    async fn stop_process(&self, pid: u32) -> TerminationOutcome {
        let terminated = match self.host.terminate(pid).await {
            Ok(()) => true,
            Err(HostError::NotFound(_)) => return TerminationOutcome::Vanished,
            Err(HostError::PermissionDenied(_)) => return TerminationOutcome::PermissionDenied,
            Err(e) => {
                debug!(pid, error = %e, "Graceful termination failed, escalating");
                false
            }
        };

        if terminated {
            match self.host.wait_for_exit(pid, self.grace_timeout).await {
                Ok(true) => return TerminationOutcome::TerminatedGracefully,
                Ok(false) => {
                    debug!(pid, timeout_ms = self.grace_timeout.as_millis() as u64, "Grace period expired");
                }
                Err(e) => debug!(pid, error = %e, "Could not observe exit, escalating"),
            }
        }

        match self.host.kill(pid).await {
            Ok(()) => TerminationOutcome::ForceKilled,
            // Exited between the last check and the kill
            Err(HostError::NotFound(_)) if terminated => TerminationOutcome::TerminatedGracefully,
            Err(HostError::NotFound(_)) => TerminationOutcome::Vanished,
            Err(HostError::PermissionDenied(_)) => TerminationOutcome::PermissionDenied,
            Err(e) => TerminationOutcome::Failed(e.to_string()),
        }
    }

    fn report(&mut self, pid: u32, name: &str, outcome: &TerminationOutcome) {
        match outcome {
            TerminationOutcome::TerminatedGracefully => info!(pid, name, "Process terminated"),
            TerminationOutcome::ForceKilled => {
                info!(pid, name, "Process force killed after timeout")
            }
            TerminationOutcome::Vanished => debug!(pid, name, "Process exited before it was signalled"),
            TerminationOutcome::PermissionDenied => {
                if self.denied_reported.insert(pid) {
                    warn!(pid, name, "Permission denied terminating process");
                }
            }
            TerminationOutcome::Failed(error) => {
                warn!(pid, name, error = %error, "Failed to terminate process")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curfew_host_api::{MockExit, MockProcessHost};

    const TARGET: &str = "/opt/games/bin/game";

    fn enforcer(host: &Arc<MockProcessHost>) -> ProcessEnforcer {
        ProcessEnforcer::new(host.clone(), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn zero_matches_is_silent_success() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(1, "/sbin/init", MockExit::OnTerminate);
        host.spawn(2, "/opt/games/bin/game-launcher", MockExit::OnTerminate);
        host.spawn_unreadable(3, "kworker/0:1");

        let outcomes = enforcer(&host).sweep(Path::new(TARGET)).await.unwrap();

        assert!(outcomes.is_empty());
        assert!(host.terminate_calls().is_empty());
        assert!(host.kill_calls().is_empty());
    }

    #[tokio::test]
    async fn graceful_exit_needs_no_kill() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(10, TARGET, MockExit::OnTerminate);

        let outcomes = enforcer(&host).sweep(Path::new(TARGET)).await.unwrap();

        assert_eq!(
            outcomes,
            vec![SweepOutcome {
                pid: 10,
                name: "game".into(),
                outcome: TerminationOutcome::TerminatedGracefully,
            }]
        );
        assert_eq!(host.terminate_calls(), vec![10]);
        assert!(host.kill_calls().is_empty());
    }

    #[tokio::test]
    async fn stubborn_process_is_killed_exactly_once() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(11, TARGET, MockExit::OnKill);

        let outcomes = enforcer(&host).sweep(Path::new(TARGET)).await.unwrap();

        assert_eq!(outcomes[0].outcome, TerminationOutcome::ForceKilled);
        assert_eq!(host.kill_calls(), vec![11]);
        assert!(!host.is_running(11));
    }

    #[tokio::test]
    async fn vanished_and_denied_do_not_stop_the_sweep() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(20, TARGET, MockExit::Vanish);
        host.spawn(21, TARGET, MockExit::Protected);
        host.spawn(22, TARGET, MockExit::OnTerminate);

        let outcomes = enforcer(&host).sweep(Path::new(TARGET)).await.unwrap();
        let by_pid = |pid| outcomes.iter().find(|o| o.pid == pid).unwrap().outcome.clone();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(by_pid(20), TerminationOutcome::Vanished);
        assert_eq!(by_pid(21), TerminationOutcome::PermissionDenied);
        assert_eq!(by_pid(22), TerminationOutcome::TerminatedGracefully);
        assert!(host.kill_calls().is_empty());
    }

    #[tokio::test]
    async fn denied_pids_are_remembered_until_they_disappear() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(30, TARGET, MockExit::Protected);
        let mut enforcer = enforcer(&host);

        enforcer.sweep(Path::new(TARGET)).await.unwrap();
        enforcer.sweep(Path::new(TARGET)).await.unwrap();
        assert!(enforcer.denied_reported.contains(&30));

        let empty: Arc<dyn ProcessHost> = Arc::new(MockProcessHost::new());
        enforcer.host = empty;
        enforcer.sweep(Path::new(TARGET)).await.unwrap();
        assert!(enforcer.denied_reported.is_empty());
    }

    #[tokio::test]
    async fn relaunched_instance_is_caught_next_sweep() {
        let host = Arc::new(MockProcessHost::new());
        let mut enforcer = enforcer(&host);

        host.spawn(40, TARGET, MockExit::OnTerminate);
        enforcer.sweep(Path::new(TARGET)).await.unwrap();

        host.spawn(41, TARGET, MockExit::OnTerminate);
        let outcomes = enforcer.sweep(Path::new(TARGET)).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].pid, 41);
        assert_eq!(host.terminate_calls(), vec![40, 41]);
    }

    #[tokio::test]
    async fn target_is_normalized() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(50, TARGET, MockExit::OnTerminate);

        let outcomes = enforcer(&host)
            .sweep(Path::new("/opt/games/./lib/../bin/game"))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
    }

    #[tokio::test]
    async fn enumeration_failure_is_an_error() {
        let host = Arc::new(MockProcessHost::new());
        host.fail_next_enumerations(1);

        let result = enforcer(&host).sweep(Path::new(TARGET)).await;
        assert!(matches!(result, Err(HostError::Enumeration(_))));
    }
}
