//! The child process interface.
//!
//! The registry never touches `std::process` directly. It asks a
//! [`ProcessLauncher`] for a [`ChildProcess`] and only uses the handful of
//! operations below, so tests can substitute fakes for real subprocesses.

use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitStatus;

/// Combined stdout and stderr of a child, readable until the child closes it.
pub type MergedOutput = Box<dyn Read + Send + 'static>;

/// Everything needed to launch a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable to run (absolute path or a name resolved through `PATH`).
    pub program: PathBuf,

    /// Arguments, in order.
    pub args: Vec<OsString>,

    /// Working directory of the child.
    pub current_dir: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, current_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: current_dir.into(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// A launched child process.
pub trait ChildProcess: Send {
    /// OS process id, if the platform exposes one.
    fn pid(&self) -> Option<u32>;

    /// Hands out the merged output stream. Returns `None` after the first call.
    fn take_output(&mut self) -> Option<MergedOutput>;

    /// Asks the process to exit (SIGTERM on Unix). Does not wait.
    fn terminate(&mut self) -> io::Result<()>;

    /// Kills the process without giving it a chance to clean up. Does not wait.
    fn kill(&mut self) -> io::Result<()>;

    /// Returns the exit status if the process has exited, reaping it.
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>>;

    /// Blocks until the process exits.
    fn wait(&mut self) -> io::Result<ExitStatus>;
}

/// Starts child processes.
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, spec: &CommandSpec) -> io::Result<Box<dyn ChildProcess>>;
}
