//! Process existence checking.

use std::io;

/// Check if a process with the given PID exists.
///
/// On Unix this uses `kill(pid, 0)`, which delivers no signal but reports
/// whether the process exists. On Windows it tries `OpenProcess`.
///
/// # Returns
///
/// * `Ok(true)` - Process exists (a zombie that has not been reaped counts)
/// * `Ok(false)` - Process does not exist
/// * `Err(_)` - The check itself failed
pub fn process_exists(pid: u32) -> io::Result<bool> {
    #[cfg(unix)]
    {
        process_exists_unix(pid)
    }

    #[cfg(windows)]
    {
        process_exists_windows(pid)
    }
}

#[cfg(unix)]
fn process_exists_unix(pid: u32) -> io::Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return Ok(false);
    };

    match kill(Pid::from_raw(raw), None) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        // Exists, but belongs to someone else
        Err(Errno::EPERM) => Ok(true),
        Err(e) => Err(io::Error::from(e)),
    }
}

#[cfg(windows)]
fn process_exists_windows(pid: u32) -> io::Result<bool> {
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

    const ERROR_INVALID_PARAMETER: u32 = 0x80070057;
    const ERROR_ACCESS_DENIED: u32 = 0x80070005;

    unsafe {
        let handle: HANDLE = match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
            Ok(h) => h,
            Err(e) => {
                let code = e.code().0 as u32;
                if code == ERROR_INVALID_PARAMETER {
                    return Ok(false);
                }
                if code == ERROR_ACCESS_DENIED {
                    return Ok(true);
                }
                return Err(io::Error::other(format!("Failed to check process {}: {}", pid, e)));
            }
        };

        let _ = CloseHandle(handle);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_process_exists() {
        assert!(process_exists(std::process::id()).unwrap());
    }

    #[test]
    #[cfg(unix)]
    fn test_reaped_child_does_not_exist() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();

        // The pid could in theory be recycled already, but not this fast.
        assert!(!process_exists(pid).unwrap());
    }
}
