//! Reload trigger.
//!
//! Asks a gateway process to re-read its configuration by sending it `SIGHUP`.
//! The request is fire-and-forget: a successful return means the signal was
//! delivered, not that the reload happened.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReloadError {
    /// Process identity unknown; nothing was signalled.
    #[error("no pid")]
    NoPid,

    #[error("pid {0} is out of range")]
    InvalidPid(u32),

    #[error("failed to signal pid {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("signal-based reload is not supported on this platform")]
    Unsupported,
}

/// Something that can ask a process to reload.
pub trait Reloader: Send + Sync {
    fn reload(&self, pid: u32) -> Result<(), ReloadError>;
}

/// Sends `SIGHUP` to the target process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalReloader;

impl Reloader for SignalReloader {
    fn reload(&self, pid: u32) -> Result<(), ReloadError> {
        if pid == 0 {
            return Err(ReloadError::NoPid);
        }
        send_hangup(pid)
    }
}

#[cfg(unix)]
fn send_hangup(pid: u32) -> Result<(), ReloadError> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| ReloadError::InvalidPid(pid))?;
    tracing::info!(pid, "Sending reload signal");
    kill(Pid::from_raw(raw), Signal::SIGHUP).map_err(|errno| ReloadError::Signal {
        pid,
        source: errno.into(),
    })
}

#[cfg(not(unix))]
fn send_hangup(_pid: u32) -> Result<(), ReloadError> {
    Err(ReloadError::Unsupported)
}
