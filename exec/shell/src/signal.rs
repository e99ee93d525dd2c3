//! Signal delivery to spawned process groups.
//!
//! Every child is started as the leader of its own process group, so
//! signalling the group reaches grandchildren (a `sh -c` wrapper and the
//! command it runs) as well.

/// Signals the engine sends to child processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessSignal {
    /// SIGTERM: ask the process to exit.
    Terminate,
    /// SIGKILL: force it.
    Kill,
}

impl ProcessSignal {
    #[cfg(unix)]
    fn as_raw(self) -> libc::c_int {
        match self {
            ProcessSignal::Terminate => libc::SIGTERM,
            ProcessSignal::Kill => libc::SIGKILL,
        }
    }
}

/// Result of a delivered signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Delivered,
    /// No such process group; it already exited.
    NotRunning,
}

/// Sends `signal` to the process group led by `pid`.
///
/// Falls back to the single process when the group cannot be addressed.
#[cfg(unix)]
pub fn signal_process_group(pid: u32, signal: ProcessSignal) -> std::io::Result<SignalOutcome> {
    let Ok(raw_pid) = libc::pid_t::try_from(pid) else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("pid {pid} out of range"),
        ));
    };
    let sig = signal.as_raw();

    // SAFETY: killpg/kill have no memory-safety preconditions.
    let mut rc = unsafe { libc::killpg(raw_pid, sig) };
    if rc == -1 && std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM) {
        rc = unsafe { libc::kill(raw_pid, sig) };
    }
    if rc == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            return Ok(SignalOutcome::NotRunning);
        }
        return Err(err);
    }
    Ok(SignalOutcome::Delivered)
}

/// Whether a process with this pid exists (zombies included).
#[cfg(unix)]
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(raw_pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // SAFETY: signal 0 performs only the existence and permission check.
    let rc = unsafe { libc::kill(raw_pid, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Exit code and terminating signal of a finished process.
pub fn exit_parts(status: std::process::ExitStatus) -> (Option<i32>, Option<i32>) {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        (status.code(), status.signal())
    }
    #[cfg(not(unix))]
    {
        (status.code(), None)
    }
}

#[cfg(test)]
#[path = "signal.test.rs"]
mod tests;
