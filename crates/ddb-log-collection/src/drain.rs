//! Background draining of a child's merged output.

use crate::output::OutputWriter;
use crate::types::LogEntry;
use ddb_common::Port;
use std::io::{self, BufRead, BufReader, Read};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// `tracing` target the emulator's own output is logged under.
pub const EMULATOR_LOG_TARGET: &str = "ddb_local::emulator";

/// Where a drain sends the lines it reads.
pub struct DrainConfig {
    pub port: Port,
    pub outputs: Vec<Box<dyn OutputWriter>>,
}

impl DrainConfig {
    pub fn new(port: Port) -> Self {
        Self {
            port,
            outputs: Vec::new(),
        }
    }

    pub fn with_output(mut self, output: Box<dyn OutputWriter>) -> Self {
        self.outputs.push(output);
        self
    }
}

/// What a finished drain read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub lines: u64,
    pub bytes: u64,
}

/// Handle to a running drain thread.
///
/// Dropping it detaches the thread; it keeps reading until the stream
/// closes and never keeps the host process alive.
#[derive(Debug)]
pub struct DrainHandle {
    thread: JoinHandle<DrainSummary>,
}

impl DrainHandle {
    /// Blocks until the stream closes. `None` if the drain thread panicked.
    pub fn join(self) -> Option<DrainSummary> {
        self.thread.join().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Starts a thread that reads `output` line by line until it closes.
///
/// Every line is logged at `info` under [`EMULATOR_LOG_TARGET`] and handed
/// to the configured outputs. Read errors end the thread; they are logged
/// and never reported to the caller.
pub fn spawn_drain<R>(config: DrainConfig, output: R) -> io::Result<DrainHandle>
where
    R: Read + Send + 'static,
{
    let thread = thread::Builder::new()
        .name(format!("ddb-drain-{}", config.port))
        .spawn(move || drain(config, output))?;

    Ok(DrainHandle { thread })
}

fn drain(mut config: DrainConfig, output: impl Read) -> DrainSummary {
    let port = config.port;
    debug!(%port, "Output drain started");

    let mut reader = BufReader::new(output);
    let mut buf = Vec::new();
    let mut summary = DrainSummary::default();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                debug!(%port, "Output stream closed");
                break;
            }
            Ok(n) => {
                summary.lines += 1;
                summary.bytes += n as u64;

                // The JVM writes in the platform charset; never fail on it
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim_end_matches(['\n', '\r']);
                info!(target: EMULATOR_LOG_TARGET, %port, "{}", line);

                let entry = LogEntry::new(port, line);
                config.outputs.retain_mut(|out| match out.write(&entry) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(%port, error = %e, "Dropping failing log output");
                        false
                    }
                });
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(%port, error = %e, "Error reading emulator output");
                break;
            }
        }
    }

    for out in config.outputs.iter_mut() {
        if let Err(e) = out.flush() {
            warn!(%port, error = %e, "Error flushing log output");
        }
    }

    debug!(%port, lines = summary.lines, bytes = summary.bytes, "Output drain finished");
    summary
}
