//! curfewd - The curfew background service
//!
//! This is the main entry point for the curfew service.
//! It wires together all the components:
//! - Daemon settings loading
//! - Block state store
//! - Host adapter (Linux)
//! - Monitor loop

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use curfew_config::{DaemonSettings, load_config_or_default};
use curfew_core::{Monitor, MonitorEvent, MonitorSettings, MonitorStatus, TerminationOutcome, evaluate};
use curfew_host_linux::LinuxProcessHost;
use curfew_store::{BlockConfig, ConfigStore, JsonFileStore};
use curfew_util::{
    CURFEW_STATE_FILE_ENV, WallClock, default_config_path, default_state_file, display_name,
    is_mock_time_active,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// curfewd - Daily cutoff enforcement for one application
#[derive(Parser, Debug)]
#[command(name = "curfewd")]
#[command(about = "Terminates one application after a daily cutoff time", long_about = None)]
struct Args {
    /// Settings file path (default: ~/.config/curfew/config.toml)
    #[arg(short, long, global = true, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// State file override (or set CURFEW_STATE_FILE env var)
    #[arg(short, long, global = true, env = CURFEW_STATE_FILE_ENV)]
    state_file: Option<PathBuf>,

    /// Log level
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Monitor the target and enforce the cutoff (default)
    Run,

    /// Show the target, the cutoff and today's block state
    Status,

    /// Choose the target application and cutoff
    Set {
        /// Executable to govern
        #[arg(short, long)]
        target: PathBuf,

        /// Daily cutoff as HH:MM (default: keep the current one)
        #[arg(long)]
        cutoff: Option<WallClock>,
    },
}

impl Args {
    fn settings(&self) -> Result<DaemonSettings> {
        load_config_or_default(&self.config)
            .with_context(|| format!("Failed to load settings from {:?}", self.config))
    }

    /// CLI/env override, then the settings file, then the data directory
    fn state_file(&self, settings: &DaemonSettings) -> PathBuf {
        self.state_file
            .clone()
            .or_else(|| settings.state_file.clone())
            .unwrap_or_else(default_state_file)
    }
}

async fn run(args: &Args) -> Result<()> {
    let settings = args.settings()?;
    let state_file = args.state_file(&settings);

    let store = Arc::new(JsonFileStore::new(&state_file));
    let config = store.load();

    info!(
        state_file = %state_file.display(),
        tick_ms = settings.tick_interval.as_millis() as u64,
        "Settings loaded"
    );

    if is_mock_time_active() {
        warn!("Mock time is active, cutoffs follow the simulated clock");
    }

    if !nix::unistd::geteuid().is_root() {
        warn!("Not running as root, processes owned by other users cannot be terminated");
    }

    let host = Arc::new(LinuxProcessHost::new());
    let mut handle = Monitor::new(host, store, MonitorSettings::from(&settings))
        .start(config)
        .context("Cannot start monitoring; choose a target with `curfewd set --target <PATH>`")?;
    let mut events = handle
        .take_events()
        .context("Monitor event receiver already taken")?;

    let mut sigterm = signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

    info!("Service running");

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
                break;
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, shutting down gracefully");
                break;
            }

            event = events.recv() => match event {
                Some(event) => log_event(&event),
                None => {
                    warn!("Monitor ended unexpectedly");
                    break;
                }
            },
        }
    }

    info!("Shutting down curfewd");

    let acknowledged = handle.stop(settings.shutdown_timeout).await;
    while let Ok(event) = events.try_recv() {
        log_event(&event);
    }

    if acknowledged {
        info!("Shutdown complete");
    } else {
        warn!("Monitor did not stop in time, exiting anyway");
    }
    Ok(())
}

fn log_event(event: &MonitorEvent) {
    match event {
        MonitorEvent::StatusChanged { status, message } => {
            info!(status = ?status, "{}", message);
        }
        MonitorEvent::ProcessHandled(handled) => match &handled.outcome {
            TerminationOutcome::Failed(error) => {
                debug!(pid = handled.pid, error = %error, "Termination failed");
            }
            outcome => debug!(pid = handled.pid, outcome = ?outcome, "Process handled"),
        },
        MonitorEvent::Stopped => info!("Monitor acknowledged shutdown"),
        other => debug!(event = ?other, "Monitor event"),
    }
}

fn status(args: &Args) -> Result<()> {
    let settings = args.settings()?;
    let state_file = args.state_file(&settings);
    let config = JsonFileStore::new(&state_file).load();
    let now = curfew_util::local_now();

    println!("State file: {}", state_file.display());
    if is_mock_time_active() {
        println!("Now:        {} (mock time)", curfew_util::format_datetime_full(&now));
    } else {
        println!("Now:        {}", curfew_util::format_datetime_full(&now));
    }
    println!("Cutoff:     {}", config.cutoff);

    let Some(target) = config.target() else {
        println!("Target:     (not set)");
        println!("Status:     {}", MonitorStatus::Idle.message(""));
        return Ok(());
    };
    println!("Target:     {}", target.display());

    // What the monitor would decide right now; nothing is persisted
    let evaluation = evaluate(now, &config);
    let status = if evaluation.config.block_active() {
        MonitorStatus::Blocked
    } else {
        MonitorStatus::Unblocked {
            cutoff: config.cutoff,
        }
    };
    println!("Status:     {}", status.message(&display_name(target)));
    Ok(())
}

fn set(args: &Args, target: &Path, cutoff: Option<WallClock>) -> Result<()> {
    let settings = args.settings()?;
    let state_file = args.state_file(&settings);
    let store = JsonFileStore::new(&state_file);

    let config = with_target(store.load(), target, cutoff)?;
    store
        .save(&config)
        .with_context(|| format!("Failed to save state to {:?}", state_file))?;

    info!(
        state_file = %state_file.display(),
        block_active = config.block_active(),
        "Target configured"
    );
    if let Some(target) = config.target() {
        println!("Target: {}", target.display());
    }
    println!("Cutoff: {}", config.cutoff);
    Ok(())
}

/// Point `config` at a new target. Today's block, if any, survives the change.
fn with_target(mut config: BlockConfig, target: &Path, cutoff: Option<WallClock>) -> Result<BlockConfig> {
    let metadata = std::fs::metadata(target)
        .with_context(|| format!("Target {:?} does not exist", target))?;
    if !metadata.is_file() {
        bail!("Target {:?} is not a file", target);
    }

    let target = std::fs::canonicalize(target)
        .with_context(|| format!("Failed to resolve target {:?}", target))?;

    config.target_path = Some(target);
    if let Some(cutoff) = cutoff {
        config.cutoff = cutoff;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    match &args.command {
        None | Some(Command::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "curfewd starting");
            run(&args).await
        }
        Some(Command::Status) => status(&args),
        Some(Command::Set { target, cutoff }) => set(&args, target, *cutoff),
    }
}
