//! The monitor loop: evaluate, persist, enforce, sleep
//!
//! One background task drives the block state machine and the process
//! enforcer on a fixed cadence. The owner talks to it through a
//! [`MonitorHandle`]: a watch channel for shutdown, an event channel for
//! status, and a shared accessor for the block configuration.

use chrono::NaiveDateTime;
use curfew_config::DaemonSettings;
use curfew_host_api::{HostResult, ProcessHost};
use curfew_store::{BlockConfig, ConfigStore};
use curfew_util::{CurfewError, WallClock, display_name};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{Evaluation, MonitorEvent, MonitorStatus, ProcessEnforcer, Transition, evaluate};

/// Source of local wall-clock time, sampled once per tick
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Timing knobs for the monitor loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub tick_interval: Duration,
    pub terminate_timeout: Duration,
    pub failure_threshold: u32,
    pub failure_backoff: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from(&DaemonSettings::default())
    }
}

impl From<&DaemonSettings> for MonitorSettings {
    fn from(settings: &DaemonSettings) -> Self {
        Self {
            tick_interval: settings.tick_interval,
            terminate_timeout: settings.terminate_timeout,
            failure_threshold: settings.failure_threshold,
            failure_backoff: settings.failure_backoff,
        }
    }
}

/// Single synchronized accessor for the block configuration.
///
/// The loop evaluates, persists and assigns while holding the lock, so a
/// reader never observes a state that has not been handed to the store.
#[derive(Clone)]
pub struct SharedBlockConfig(Arc<Mutex<BlockConfig>>);

impl SharedBlockConfig {
    pub fn new(config: BlockConfig) -> Self {
        Self(Arc::new(Mutex::new(config)))
    }

    /// Copy of the current configuration
    pub async fn snapshot(&self) -> BlockConfig {
        self.0.lock().await.clone()
    }

    async fn lock(&self) -> MutexGuard<'_, BlockConfig> {
        self.0.lock().await
    }
}

/// Builder for a monitor task
pub struct Monitor {
    host: Arc<dyn ProcessHost>,
    store: Arc<dyn ConfigStore>,
    settings: MonitorSettings,
    clock: Clock,
}

impl Monitor {
    pub fn new(
        host: Arc<dyn ProcessHost>,
        store: Arc<dyn ConfigStore>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            host,
            store,
            settings,
            clock: Arc::new(curfew_util::local_now),
        }
    }

    /// Replace the wall clock (tests, simulated days)
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Spawn the monitor loop for `config`.
    ///
    /// Fails with [`CurfewError::ConfigurationMissing`] when no target is
    /// configured; the loop is never started in that case. Must be called
    /// from within a tokio runtime.
    pub fn start(self, config: BlockConfig) -> curfew_util::Result<MonitorHandle> {
        let Some(target) = config.target_path.clone() else {
            return Err(CurfewError::ConfigurationMissing);
        };

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cutoff = config.cutoff;
        let shared = SharedBlockConfig::new(config);

        let monitor_loop = MonitorLoop {
            target_name: display_name(&target),
            target,
            cutoff,
            config: shared.clone(),
            store: self.store,
            enforcer: ProcessEnforcer::new(self.host, self.settings.terminate_timeout),
            settings: self.settings,
            clock: self.clock,
            events: event_tx,
            shutdown: shutdown_rx,
            status: None,
            unsaved: false,
            persist_failures: 0,
            consecutive_failures: 0,
        };

        let task = tokio::spawn(monitor_loop.run());

        Ok(MonitorHandle {
            shutdown_tx,
            events: Some(event_rx),
            config: shared,
            task,
        })
    }
}

/// Owner's side of a running monitor
pub struct MonitorHandle {
    shutdown_tx: watch::Sender<bool>,
    events: Option<mpsc::UnboundedReceiver<MonitorEvent>>,
    config: SharedBlockConfig,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Take the event receiver (can only be called once)
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<MonitorEvent>> {
        self.events.take()
    }

    pub fn config(&self) -> SharedBlockConfig {
        self.config.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request shutdown and wait up to `timeout` for the loop to finish.
    ///
    /// Returns whether the loop acknowledged. On timeout the task is left to
    /// finish on its own.
    pub async fn stop(self, timeout: Duration) -> bool {
        let _ = self.shutdown_tx.send(true);

        match tokio::time::timeout(timeout, self.task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Monitor task ended abnormally");
                false
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Monitor did not acknowledge shutdown in time"
                );
                false
            }
        }
    }
}

struct MonitorLoop {
    target: PathBuf,
    target_name: String,
    cutoff: WallClock,
    config: SharedBlockConfig,
    store: Arc<dyn ConfigStore>,
    enforcer: ProcessEnforcer,
    settings: MonitorSettings,
    clock: Clock,
    events: mpsc::UnboundedSender<MonitorEvent>,
    shutdown: watch::Receiver<bool>,

    /// Last status sent to the owner
    status: Option<MonitorStatus>,
    /// The in-memory configuration differs from what the store holds
    unsaved: bool,
    persist_failures: u32,
    consecutive_failures: u32,
}

impl MonitorLoop {
    async fn run(mut self) {
        info!(
            path = %self.target.display(),
            cutoff = %self.cutoff,
            "Monitoring {}, block after {}",
            self.target_name,
            self.cutoff
        );
        self.emit(MonitorEvent::Started {
            target: self.target.clone(),
            cutoff: self.cutoff,
        });

        loop {
            if self.shutdown_requested() {
                break;
            }

            let delay = match self.tick().await {
                Ok(()) => {
                    self.consecutive_failures = 0;
                    self.settings.tick_interval
                }
                Err(e) => {
                    self.consecutive_failures += 1;
                    warn!(
                        error = %e,
                        consecutive = self.consecutive_failures,
                        "Monitor tick failed, will retry"
                    );
                    self.emit(MonitorEvent::TickFailed {
                        error: e.to_string(),
                        consecutive: self.consecutive_failures,
                    });

                    if self.consecutive_failures >= self.settings.failure_threshold {
                        self.settings.failure_backoff
                    } else {
                        self.settings.tick_interval
                    }
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.finish().await;
    }

    /// A dropped handle counts as a shutdown request
    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow() || self.shutdown.has_changed().is_err()
    }

    async fn tick(&mut self) -> HostResult<()> {
        let now = (self.clock)();

        let blocked = {
            let shared = self.config.clone();
            let mut config = shared.lock().await;

            let evaluation = evaluate(now, &config);
            if evaluation.changed() {
                *config = evaluation.config.clone();
                self.unsaved = true;
                self.report_transition(&evaluation, now);
            }

            // Persisted before any enforcement runs
            if self.unsaved {
                self.persist(&config).await;
            }

            config.block_active()
        };

        self.update_status(if blocked {
            MonitorStatus::Blocked
        } else {
            MonitorStatus::Unblocked {
                cutoff: self.cutoff,
            }
        });

        if blocked {
            for outcome in self.enforcer.sweep(&self.target).await? {
                self.emit(MonitorEvent::ProcessHandled(outcome));
            }
        }

        Ok(())
    }

    fn report_transition(&self, evaluation: &Evaluation, now: NaiveDateTime) {
        if let Some(date) = evaluation.cleared {
            info!(block_date = %date, "New day, previous block cleared");
            self.emit(MonitorEvent::Transition {
                transition: Transition::Reset,
                date,
            });
        }

        if evaluation.transition == Transition::Activated {
            info!(
                cutoff = %self.cutoff,
                now = %curfew_util::format_datetime_full(&now),
                "Cutoff reached, blocking {} until tomorrow",
                self.target_name
            );
            self.emit(MonitorEvent::Transition {
                transition: Transition::Activated,
                date: now.date(),
            });
        }
    }

    /// Save `config` on the blocking pool. The caller keeps the shared lock,
    /// so readers wait for the write to land.
    async fn persist(&mut self, config: &BlockConfig) {
        let store = self.store.clone();
        let snapshot = config.clone();
        let saved = match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("Persist task failed: {}", e)),
        };

        match saved {
            Ok(()) => {
                if self.persist_failures > 0 {
                    info!(attempts = self.persist_failures + 1, "Block state persisted after retry");
                }
                self.unsaved = false;
                self.persist_failures = 0;
            }
            Err(e) => {
                self.persist_failures += 1;
                if self.persist_failures == 1 {
                    warn!(error = %e, "Failed to persist block state, will retry");
                } else {
                    debug!(error = %e, attempts = self.persist_failures, "Persist retry failed");
                }
                self.emit(MonitorEvent::PersistFailed { error: e });
            }
        }
    }

    fn update_status(&mut self, status: MonitorStatus) {
        if self.status == Some(status) {
            return;
        }

        let message = status.message(&self.target_name);
        debug!(?status, message = %message, "Status changed");
        self.status = Some(status);
        self.emit(MonitorEvent::StatusChanged { status, message });
    }

    async fn finish(&mut self) {
        if self.unsaved {
            let shared = self.config.clone();
            let config = shared.lock().await;
            self.persist(&config).await;
        }

        info!("Monitoring stopped");
        self.emit(MonitorEvent::Stopped);
    }

    fn emit(&self, event: MonitorEvent) {
        // The owner may have stopped listening
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use curfew_host_api::{MockExit, MockProcessHost};
    use curfew_store::{MemoryConfigStore, StoreResult};
    use std::sync::Mutex as StdMutex;
    use std::time::Instant;

    const TARGET: &str = "/opt/games/bin/game";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).unwrap()
    }

    fn fast_settings() -> MonitorSettings {
        MonitorSettings {
            tick_interval: Duration::from_millis(5),
            terminate_timeout: Duration::from_millis(5),
            failure_threshold: 3,
            failure_backoff: Duration::from_millis(20),
        }
    }

    fn five_pm() -> BlockConfig {
        BlockConfig::new(TARGET, WallClock::new(17, 0).unwrap())
    }

    fn monitor(
        host: &Arc<MockProcessHost>,
        store: &Arc<MemoryConfigStore>,
        now: NaiveDateTime,
    ) -> Monitor {
        Monitor::new(host.clone(), store.clone(), fast_settings()).with_clock(move || now)
    }

    async fn wait_for(
        events: &mut mpsc::UnboundedReceiver<MonitorEvent>,
        mut pred: impl FnMut(&MonitorEvent) -> bool,
    ) -> MonitorEvent {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let event = events.recv().await.expect("event channel closed");
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    async fn drain(events: &mut mpsc::UnboundedReceiver<MonitorEvent>) -> Vec<MonitorEvent> {
        let mut all = Vec::new();
        while let Some(event) = events.recv().await {
            all.push(event);
        }
        all
    }

    #[tokio::test]
    async fn start_without_target_fails() {
        let host = Arc::new(MockProcessHost::new());
        let store = Arc::new(MemoryConfigStore::new());

        let result = monitor(&host, &store, at(22, 18, 0)).start(BlockConfig::default());

        assert!(matches!(result, Err(CurfewError::ConfigurationMissing)));
        assert_eq!(host.enumerate_calls(), 0);
    }

    #[tokio::test]
    async fn activation_is_persisted_and_enforced() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(100, TARGET, MockExit::OnKill);
        let store = Arc::new(MemoryConfigStore::new());

        let mut handle = monitor(&host, &store, at(22, 17, 30)).start(five_pm()).unwrap();
        let mut events = handle.take_events().unwrap();

        let event = wait_for(&mut events, |e| matches!(e, MonitorEvent::Transition { .. })).await;
        assert!(matches!(
            event,
            MonitorEvent::Transition { transition: Transition::Activated, date } if date == day(22)
        ));

        wait_for(&mut events, |e| matches!(e, MonitorEvent::ProcessHandled(_))).await;
        assert_eq!(host.kill_calls(), vec![100]);
        assert_eq!(store.saves().first().unwrap().block_date, Some(day(22)));
        assert!(handle.config().snapshot().await.block_active());

        assert!(handle.stop(Duration::from_secs(1)).await);
    }

    /// Records how many terminations had been requested at each save
    struct OrderingStore {
        host: Arc<MockProcessHost>,
        terminations_at_save: StdMutex<Vec<usize>>,
    }

    impl ConfigStore for OrderingStore {
        fn load(&self) -> BlockConfig {
            BlockConfig::default()
        }

        fn save(&self, _config: &BlockConfig) -> StoreResult<()> {
            let terminations = self.host.terminate_calls().len();
            self.terminations_at_save.lock().unwrap().push(terminations);
            Ok(())
        }
    }

    #[tokio::test]
    async fn activation_is_persisted_before_any_termination() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(104, TARGET, MockExit::OnTerminate);
        let store = Arc::new(OrderingStore {
            host: host.clone(),
            terminations_at_save: StdMutex::new(Vec::new()),
        });

        let now = at(22, 17, 30);
        let mut handle = Monitor::new(host.clone(), store.clone(), fast_settings())
            .with_clock(move || now)
            .start(five_pm())
            .unwrap();
        let mut events = handle.take_events().unwrap();

        wait_for(&mut events, |e| matches!(e, MonitorEvent::ProcessHandled(_))).await;
        assert!(handle.stop(Duration::from_secs(1)).await);

        assert_eq!(*store.terminations_at_save.lock().unwrap(), vec![0]);
        assert_eq!(host.terminate_calls(), vec![104]);
    }

    /// A store whose writes take far longer than a tick
    struct SlowStore {
        delay: Duration,
        save_started: StdMutex<Option<Instant>>,
        saves: StdMutex<u32>,
    }

    impl ConfigStore for SlowStore {
        fn load(&self) -> BlockConfig {
            BlockConfig::default()
        }

        fn save(&self, _config: &BlockConfig) -> StoreResult<()> {
            self.save_started.lock().unwrap().get_or_insert_with(Instant::now);
            std::thread::sleep(self.delay);
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_save_does_not_block_the_runtime() {
        let host = Arc::new(MockProcessHost::new());
        let store = Arc::new(SlowStore {
            delay: Duration::from_millis(500),
            save_started: StdMutex::new(None),
            saves: StdMutex::new(0),
        });

        let now = at(22, 18, 0);
        let handle = Monitor::new(host.clone(), store.clone(), fast_settings())
            .with_clock(move || now)
            .start(five_pm())
            .unwrap();

        // Single-threaded runtime: this task only runs while the save is in flight
        // if the save is off the runtime thread
        let started = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(started) = *store.save_started.lock().unwrap() {
                    return started;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
        assert!(started.elapsed() < Duration::from_millis(300));
        assert_eq!(*store.saves.lock().unwrap(), 0);

        assert!(handle.stop(Duration::from_secs(2)).await);
        assert_eq!(*store.saves.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn unblocked_does_not_sweep() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(101, TARGET, MockExit::OnTerminate);
        let store = Arc::new(MemoryConfigStore::new());

        let mut handle = monitor(&host, &store, at(22, 9, 0)).start(five_pm()).unwrap();
        let mut events = handle.take_events().unwrap();

        let event = wait_for(&mut events, |e| matches!(e, MonitorEvent::StatusChanged { .. })).await;
        let MonitorEvent::StatusChanged { status, message } = event else {
            unreachable!()
        };
        assert!(matches!(status, MonitorStatus::Unblocked { .. }));
        assert_eq!(message, "Monitoring game. Allowed until 17:00.");

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(handle.stop(Duration::from_secs(1)).await);

        assert_eq!(host.enumerate_calls(), 0);
        assert!(host.is_running(101));
        assert!(store.saves().is_empty());
    }

    #[tokio::test]
    async fn status_is_reported_once_per_change() {
        let host = Arc::new(MockProcessHost::new());
        let store = Arc::new(MemoryConfigStore::new());

        let mut handle = monitor(&host, &store, at(22, 20, 0)).start(five_pm()).unwrap();
        let mut events = handle.take_events().unwrap();

        while host.enumerate_calls() < 5 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(handle.stop(Duration::from_secs(1)).await);

        let all = drain(&mut events).await;
        let statuses = all
            .iter()
            .filter(|e| matches!(e, MonitorEvent::StatusChanged { .. }))
            .count();
        assert_eq!(statuses, 1);
        assert!(matches!(all.first(), Some(MonitorEvent::Started { .. })));
        assert!(matches!(all.last(), Some(MonitorEvent::Stopped)));
    }

    #[tokio::test]
    async fn enumeration_failures_do_not_stop_the_loop() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(102, TARGET, MockExit::OnTerminate);
        host.fail_next_enumerations(4);
        let store = Arc::new(MemoryConfigStore::new());

        let mut handle = monitor(&host, &store, at(22, 20, 0)).start(five_pm()).unwrap();
        let mut events = handle.take_events().unwrap();

        let mut failures = Vec::new();
        let handled = wait_for(&mut events, |e| {
            if let MonitorEvent::TickFailed { consecutive, .. } = e {
                failures.push(*consecutive);
            }
            matches!(e, MonitorEvent::ProcessHandled(_))
        })
        .await;

        assert_eq!(failures, vec![1, 2, 3, 4]);
        assert!(matches!(handled, MonitorEvent::ProcessHandled(ref o) if o.pid == 102));
        assert!(!handle.is_finished());
        assert!(handle.stop(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn repeated_failures_back_off_and_stop_still_acks() {
        let host = Arc::new(MockProcessHost::new());
        host.fail_next_enumerations(10);
        let store = Arc::new(MemoryConfigStore::new());

        let settings = MonitorSettings {
            failure_backoff: Duration::from_secs(3600),
            ..fast_settings()
        };
        let now = at(22, 20, 0);
        let mut handle = Monitor::new(host.clone(), store.clone(), settings)
            .with_clock(move || now)
            .start(five_pm())
            .unwrap();
        let mut events = handle.take_events().unwrap();

        wait_for(&mut events, |e| matches!(e, MonitorEvent::TickFailed { consecutive: 3, .. })).await;

        // Well past several tick intervals, still inside the backoff
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(host.enumerate_calls(), 3);

        let started = Instant::now();
        assert!(handle.stop(Duration::from_secs(1)).await);
        assert!(started.elapsed() < Duration::from_secs(1));

        let rest = drain(&mut events).await;
        assert!(!rest.iter().any(|e| matches!(e, MonitorEvent::TickFailed { .. })));
        assert!(matches!(rest.last(), Some(MonitorEvent::Stopped)));
    }

    #[tokio::test]
    async fn persist_failure_is_retried_while_enforcing() {
        let host = Arc::new(MockProcessHost::new());
        host.spawn(103, TARGET, MockExit::OnTerminate);
        let store = Arc::new(MemoryConfigStore::new());
        store.set_fail_saves(true);

        let mut handle = monitor(&host, &store, at(22, 18, 0)).start(five_pm()).unwrap();
        let mut events = handle.take_events().unwrap();

        wait_for(&mut events, |e| matches!(e, MonitorEvent::PersistFailed { .. })).await;
        wait_for(&mut events, |e| matches!(e, MonitorEvent::ProcessHandled(_))).await;
        assert!(store.saves().is_empty());

        store.set_fail_saves(false);
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.saves().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(store.saves()[0].block_date, Some(day(22)));
        assert!(handle.stop(Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn unsaved_state_is_flushed_on_stop() {
        let host = Arc::new(MockProcessHost::new());
        let store = Arc::new(MemoryConfigStore::new());
        store.set_fail_saves(true);

        let settings = MonitorSettings {
            tick_interval: Duration::from_secs(3600),
            ..fast_settings()
        };
        let now = at(22, 18, 0);
        let mut handle = Monitor::new(host.clone(), store.clone(), settings)
            .with_clock(move || now)
            .start(five_pm())
            .unwrap();
        let mut events = handle.take_events().unwrap();

        wait_for(&mut events, |e| matches!(e, MonitorEvent::PersistFailed { .. })).await;
        store.set_fail_saves(false);

        assert!(handle.stop(Duration::from_secs(1)).await);
        assert_eq!(store.saves().len(), 1);
        assert_eq!(store.saves()[0].block_date, Some(day(22)));
    }

    #[tokio::test]
    async fn new_day_lifts_the_block() {
        let host = Arc::new(MockProcessHost::new());
        let store = Arc::new(MemoryConfigStore::new());
        let clock = Arc::new(StdMutex::new(at(21, 23, 59)));

        let mut blocked = five_pm();
        blocked.block_date = Some(day(21));

        let tick_clock = clock.clone();
        let mut handle = Monitor::new(host.clone(), store.clone(), fast_settings())
            .with_clock(move || *tick_clock.lock().unwrap())
            .start(blocked)
            .unwrap();
        let mut events = handle.take_events().unwrap();

        wait_for(&mut events, |e| {
            matches!(e, MonitorEvent::StatusChanged { status: MonitorStatus::Blocked, .. })
        })
        .await;

        *clock.lock().unwrap() = at(22, 0, 1);

        let event = wait_for(&mut events, |e| matches!(e, MonitorEvent::Transition { .. })).await;
        assert!(matches!(
            event,
            MonitorEvent::Transition { transition: Transition::Reset, date } if date == day(21)
        ));
        wait_for(&mut events, |e| {
            matches!(e, MonitorEvent::StatusChanged { status: MonitorStatus::Unblocked { .. }, .. })
        })
        .await;

        assert!(handle.stop(Duration::from_secs(1)).await);
        assert_eq!(store.saves().last().unwrap().block_date, None);
    }

    #[tokio::test]
    async fn stop_is_acknowledged() {
        let host = Arc::new(MockProcessHost::new());
        let store = Arc::new(MemoryConfigStore::new());

        let mut handle = monitor(&host, &store, at(22, 9, 0)).start(five_pm()).unwrap();
        let mut events = handle.take_events().unwrap();
        wait_for(&mut events, |e| matches!(e, MonitorEvent::Started { .. })).await;

        assert!(handle.stop(Duration::from_secs(1)).await);
        let rest = drain(&mut events).await;
        assert!(matches!(rest.last(), Some(MonitorEvent::Stopped)));
    }
}
