//! Process spawning with merged output.
//!
//! The child's stdout and stderr share the write end of one anonymous pipe,
//! so the reader sees both streams interleaved in the order they were written.

use crate::child::{ChildProcess, CommandSpec, MergedOutput, ProcessLauncher};
use std::io::{self, PipeReader};
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::debug;

/// Launches real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, spec: &CommandSpec) -> io::Result<Box<dyn ChildProcess>> {
        let (reader, writer) = io::pipe()?;

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.current_dir)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);

        // Keep the JVM out of our console group so Ctrl+C in the parent
        // does not reach it before the registry gets to stop it.
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
            cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
        }

        let child = cmd.spawn()?;

        // The command still owns our copies of the pipe's write end; the
        // reader only reaches EOF once they are closed.
        drop(cmd);

        debug!(pid = child.id(), command = %spec, "Spawned child process");

        Ok(Box::new(SystemChild {
            child,
            output: Some(reader),
        }))
    }
}

/// A child spawned by [`SystemLauncher`].
#[derive(Debug)]
pub struct SystemChild {
    child: Child,
    output: Option<PipeReader>,
}

impl ChildProcess for SystemChild {
    fn pid(&self) -> Option<u32> {
        Some(self.child.id())
    }

    fn take_output(&mut self) -> Option<MergedOutput> {
        self.output
            .take()
            .map(|reader| Box::new(reader) as MergedOutput)
    }

    fn terminate(&mut self) -> io::Result<()> {
        // Never signal a pid we have already reaped; it may belong to
        // someone else by now.
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        crate::terminate::terminate_gracefully(self.child.id())
    }

    fn kill(&mut self) -> io::Result<()> {
        self.child.kill()
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }
}
