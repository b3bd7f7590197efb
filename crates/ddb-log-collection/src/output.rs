//! Output writers for drained lines

use crate::types::LogEntry;
use ddb_common::{IoResultExt, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Trait for writing log entries to various outputs
pub trait OutputWriter: Send {
    /// Write a log entry
    fn write(&mut self, entry: &LogEntry) -> Result<()>;

    /// Flush any buffered output
    fn flush(&mut self) -> Result<()>;
}

/// Appends lines to a file, one per entry
pub struct FileOutputWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileOutputWriter {
    /// Opens `path` for appending, creating parent directories if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputWriter for FileOutputWriter {
    fn write(&mut self, entry: &LogEntry) -> Result<()> {
        // Format: [timestamp] [port] message
        writeln!(
            self.writer,
            "[{}] [{}] {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.port,
            entry.message
        )
        .with_context(|| format!("Failed to write to log file {}", self.path.display()))?;

        // Lines should be visible while the emulator is still running
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush log file {}", self.path.display()))
    }
}

/// Shared view of the last lines a [`RecentOutputWriter`] has seen
#[derive(Debug, Clone)]
pub struct RecentOutput {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl RecentOutput {
    /// Snapshot, oldest line first
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }
}

/// Keeps the last `capacity` lines in memory
pub struct RecentOutputWriter {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl RecentOutputWriter {
    /// Returns the writer together with a handle for reading what it kept
    pub fn new(capacity: usize) -> (Self, RecentOutput) {
        let lines = Arc::new(Mutex::new(VecDeque::with_capacity(capacity)));
        let view = RecentOutput {
            lines: Arc::clone(&lines),
        };
        (Self { lines, capacity }, view)
    }
}

impl OutputWriter for RecentOutputWriter {
    fn write(&mut self, entry: &LogEntry) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }

        let mut lines = self.lines.lock();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(entry.message.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
