//! Process termination primitives.
//!
//! This module provides cross-platform process termination by PID.

use std::io;

/// Terminate a process gracefully (SIGTERM on Unix).
///
/// On Windows there is no console to deliver Ctrl+Break to a windowless
/// JVM, so this falls back to [`force_kill`].
pub fn terminate_gracefully(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        signal(pid, nix::sys::signal::Signal::SIGTERM)
    }

    #[cfg(windows)]
    {
        force_kill(pid)
    }
}

/// Force kill a process (SIGKILL on Unix, TerminateProcess on Windows).
pub fn force_kill(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        signal(pid, nix::sys::signal::Signal::SIGKILL)
    }

    #[cfg(windows)]
    {
        use windows::Win32::Foundation::CloseHandle;
        use windows::Win32::System::Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE};

        unsafe {
            let handle = match OpenProcess(PROCESS_TERMINATE, false, pid) {
                Ok(h) if !h.is_invalid() => h,
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        format!("Failed to open process {} for termination", pid),
                    ));
                }
            };

            let result = TerminateProcess(handle, 1);
            let _ = CloseHandle(handle);

            result.map_err(|e| io::Error::other(format!("TerminateProcess failed: {}", e)))
        }
    }
}

#[cfg(unix)]
fn signal(pid: u32, signal: nix::sys::signal::Signal) -> io::Result<()> {
    use nix::unistd::Pid;

    let raw = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid PID: {}", pid)))?;

    nix::sys::signal::kill(Pid::from_raw(raw), signal).map_err(io::Error::from)
}
