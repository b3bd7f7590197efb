//! Registry of running emulator instances, keyed by port.
//!
//! [`Instances`] is an explicitly owned component: create one per build (or
//! per test) and share it behind an `Arc`. Every method takes `&self`; the
//! map is guarded internally so concurrent `start`/`stop` calls on different
//! ports never interfere.
//!
//! ## Same-port behavior
//!
//! - `stop` removes the entry, so a second `stop` on the port fails with
//!   [`Error::NotRunning`].
//! - `start` on a port that is already registered first stops the old
//!   process and waits for it to exit (killing it after `graceful_timeout`),
//!   so the new emulator can bind the port and the old one is never running
//!   inside a wiped `work_dir`.
//!
//! Concurrent `start`/`stop` on the *same* port race; the last `start` wins.
//!
//! ## Background threads
//!
//! Each started instance gets a detached drain thread reading its merged
//! output. Each stopped instance gets a reaper thread that waits up to
//! `graceful_timeout` for the child to exit, kills it otherwise, and reaps
//! it. Neither thread touches the registry lock and neither keeps the host
//! process alive. [`Instances::wait_for_stopped`] joins the reapers for
//! callers that need every stopped child gone.

use crate::command::emulator_command;
use crate::config::InstancesConfig;
use chrono::{DateTime, Utc};
use ddb_common::{Error, IoResultExt, Port, Result};
use ddb_log_collection::{
    DrainConfig, FileOutputWriter, RecentOutput, RecentOutputWriter, spawn_drain,
};
use ddb_process::{ChildProcess, ProcessLauncher, SystemLauncher};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const REAP_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Running DynamoDB Local instances.
pub struct Instances {
    config: InstancesConfig,
    launcher: Box<dyn ProcessLauncher>,
    processes: Mutex<HashMap<Port, Instance>>,
    reapers: Mutex<Vec<JoinHandle<()>>>,
}

/// A registered child and what it was started with.
struct Instance {
    child: Box<dyn ChildProcess>,
    work_dir: PathBuf,
    dir: PathBuf,
    started_at: DateTime<Utc>,
    recent_output: RecentOutput,
}

/// Snapshot of a registered instance for external queries.
#[derive(Debug, Clone)]
pub struct InstanceInfo {
    pub port: Port,
    pub pid: Option<u32>,
    /// Directory the archive was extracted into.
    pub work_dir: PathBuf,
    /// The archive's top-level directory; the child's working directory.
    pub dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl std::fmt::Debug for Instances {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instances")
            .field("config", &self.config)
            .field("ports", &self.ports())
            .finish()
    }
}

impl Instances {
    /// Registry that launches real processes.
    pub fn new(config: InstancesConfig) -> Self {
        Self::with_launcher(config, SystemLauncher::new())
    }

    /// Registry that launches children through `launcher`.
    pub fn with_launcher(config: InstancesConfig, launcher: impl ProcessLauncher + 'static) -> Self {
        Self {
            config,
            launcher: Box::new(launcher),
            processes: Mutex::new(HashMap::new()),
            reapers: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &InstancesConfig {
        &self.config
    }

    /// Unpacks `archive` into a fresh `work_dir` and starts the emulator on
    /// `port`.
    ///
    /// Any previous content of `work_dir` is deleted. Returns as soon as the
    /// child is spawned and its output drain is running. On error nothing is
    /// registered and no child is left behind. Port 0 is rejected: the
    /// emulator would pick a port nobody can look up.
    ///
    /// If `port` is already registered, the old instance is stopped first and
    /// this call blocks until it has exited, at most `graceful_timeout` plus
    /// the time a kill takes.
    /// The old instance stays stopped even if the new one then fails to
    /// start.
    pub fn start(&self, archive: &Path, work_dir: &Path, port: u16) -> Result<()> {
        if port == 0 {
            return Err(Error::config("Port must be between 1 and 65535, got: 0"));
        }

        let port = Port::new(port);
        info!(
            %port,
            archive = %archive.display(),
            work_dir = %work_dir.display(),
            "Starting DynamoDB Local"
        );

        // The old emulator holds the port and may be running inside work_dir
        let previous = self.processes.lock().remove(&port);
        if let Some(previous) = previous {
            warn!(
                %port,
                pid = ?previous.child.pid(),
                "Port was already registered, stopping the replaced instance first"
            );
            shut_down(port, previous.child, self.config.graceful_timeout);
        }

        ddb_archive::prepare_dir(work_dir)?;
        ddb_archive::extract(archive, work_dir)?;
        let dir = ddb_archive::single_top_level_dir(work_dir)?;

        // Open outputs before spawning so a bad log dir leaves no child behind
        let (drain_config, recent_output) = self.drain_config(port)?;

        let spec = emulator_command(&self.config, &dir, port.get());
        debug!(%port, command = %spec, "Launching emulator");

        let mut child = self
            .launcher
            .launch(&spec)
            .with_context(|| format!("Failed to start {}", spec.program.display()))?;

        if let Some(output) = child.take_output() {
            if let Err(e) = spawn_drain(drain_config, output) {
                error!(%port, error = %e, "Failed to start output drain, killing emulator");
                discard(port, child);
                return Err(Error::io("Failed to start output drain", e));
            }
        }

        let pid = child.pid();
        let instance = Instance {
            child,
            work_dir: work_dir.to_path_buf(),
            dir,
            started_at: Utc::now(),
            recent_output,
        };

        // Only a concurrent start on the same port can have refilled the slot
        let previous = self.processes.lock().insert(port, instance);
        if let Some(previous) = previous {
            warn!(
                %port,
                pid = ?previous.child.pid(),
                "Port was registered concurrently, terminating the replaced instance"
            );
            self.retire(port, previous);
        }

        info!(%port, pid = ?pid, "DynamoDB Local started");
        Ok(())
    }

    /// Stops the instance on `port`.
    ///
    /// Sends the graceful termination request and returns; escalation to a
    /// forced kill happens in the background after `graceful_timeout`.
    pub fn stop(&self, port: u16) -> Result<()> {
        let port = Port::new(port);
        let instance = self
            .processes
            .lock()
            .remove(&port)
            .ok_or_else(|| Error::not_running(port.get()))?;

        info!(%port, pid = ?instance.child.pid(), "Stopping DynamoDB Local");
        self.retire(port, instance);
        Ok(())
    }

    /// Stops every registered instance. Returns how many were stopped.
    pub fn stop_all(&self) -> usize {
        let mut stopped = 0;
        for port in self.ports() {
            match self.stop(port.get()) {
                Ok(()) => stopped += 1,
                // Stopped concurrently by someone else
                Err(e) => debug!(%port, error = %e, "Skipping instance"),
            }
        }
        stopped
    }

    /// Blocks until every instance stopped so far has exited and been
    /// reaped. Takes at most `graceful_timeout` plus the time a kill takes.
    pub fn wait_for_stopped(&self) {
        let reapers = std::mem::take(&mut *self.reapers.lock());
        for reaper in reapers {
            if reaper.join().is_err() {
                error!("Reaper thread panicked");
            }
        }
    }

    pub fn is_running(&self, port: u16) -> bool {
        self.processes.lock().contains_key(&Port::new(port))
    }

    /// Registered ports, ascending.
    pub fn ports(&self) -> Vec<Port> {
        let mut ports: Vec<_> = self.processes.lock().keys().copied().collect();
        ports.sort();
        ports
    }

    pub fn len(&self) -> usize {
        self.processes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.lock().is_empty()
    }

    pub fn info(&self, port: u16) -> Option<InstanceInfo> {
        let port = Port::new(port);
        self.processes.lock().get(&port).map(|instance| InstanceInfo {
            port,
            pid: instance.child.pid(),
            work_dir: instance.work_dir.clone(),
            dir: instance.dir.clone(),
            started_at: instance.started_at,
        })
    }

    /// Last lines the instance on `port` printed, oldest first.
    pub fn recent_output(&self, port: u16) -> Option<Vec<String>> {
        let recent = self
            .processes
            .lock()
            .get(&Port::new(port))
            .map(|instance| instance.recent_output.clone())?;
        Some(recent.lines())
    }

    fn drain_config(&self, port: Port) -> Result<(DrainConfig, RecentOutput)> {
        let (recent, view) = RecentOutputWriter::new(self.config.recent_output_lines);
        let mut config = DrainConfig::new(port).with_output(Box::new(recent));

        if let Some(path) = self.config.log_file(port) {
            config = config.with_output(Box::new(FileOutputWriter::new(path)?));
        }

        Ok((config, view))
    }

    /// Asks the child to exit and leaves the rest to a reaper thread.
    fn retire(&self, port: Port, mut instance: Instance) {
        if let Err(e) = instance.child.terminate() {
            warn!(%port, error = %e, "Failed to send termination request");
        }
        if let Some(reaper) = spawn_reaper(port, instance.child, self.config.graceful_timeout) {
            let mut reapers = self.reapers.lock();
            reapers.retain(|r| !r.is_finished());
            reapers.push(reaper);
        }
    }
}

impl Drop for Instances {
    fn drop(&mut self) {
        // No survivors once the owner is gone
        for (port, instance) in self.processes.get_mut().drain() {
            warn!(%port, pid = ?instance.child.pid(), "Killing instance left running at shutdown");
            discard(port, instance.child);
        }
    }
}

/// Kills a child right away and reaps it if it is already gone.
fn discard(port: Port, mut child: Box<dyn ChildProcess>) {
    if let Err(e) = child.kill() {
        warn!(%port, error = %e, "Failed to kill emulator");
    }
    let _ = child.try_wait();
}

/// Terminates a child and waits for it, killing it after `grace`.
fn shut_down(port: Port, mut child: Box<dyn ChildProcess>, grace: Duration) {
    if let Err(e) = child.terminate() {
        warn!(%port, error = %e, "Failed to send termination request");
    }
    reap(port, child, grace);
}

/// Waits for a terminated child in the background, killing it after `grace`.
fn spawn_reaper(
    port: Port,
    child: Box<dyn ChildProcess>,
    grace: Duration,
) -> Option<JoinHandle<()>> {
    let slot = Arc::new(Mutex::new(Some(child)));
    let reaper_slot = Arc::clone(&slot);

    let spawned = thread::Builder::new()
        .name(format!("ddb-reaper-{}", port))
        .spawn(move || {
            if let Some(child) = reaper_slot.lock().take() {
                reap(port, child, grace);
            }
        });

    match spawned {
        Ok(reaper) => Some(reaper),
        Err(e) => {
            warn!(%port, error = %e, "Failed to start reaper thread, killing emulator now");
            if let Some(child) = slot.lock().take() {
                discard(port, child);
            }
            None
        }
    }
}

fn reap(port: Port, mut child: Box<dyn ChildProcess>, grace: Duration) {
    let deadline = Instant::now() + grace;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                info!(%port, %status, "DynamoDB Local exited");
                return;
            }
            Ok(None) if Instant::now() < deadline => thread::sleep(REAP_POLL_INTERVAL),
            Ok(None) => break,
            Err(e) => {
                warn!(%port, error = %e, "Failed to check emulator status");
                break;
            }
        }
    }

    warn!(%port, timeout = ?grace, "DynamoDB Local did not exit in time, killing it");
    if let Err(e) = child.kill() {
        error!(%port, error = %e, "Force kill failed");
        return;
    }

    match child.wait() {
        Ok(status) => info!(%port, %status, "DynamoDB Local killed"),
        Err(e) => warn!(%port, error = %e, "Failed to reap emulator"),
    }
}
