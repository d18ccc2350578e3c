//! Platform strategies for mapping ports to processes.
//!
//! Every OS family exposes its socket table through a different listing
//! utility with a different column layout. [`Platform`] is chosen once at
//! startup and hides that difference behind two operations:
//! [`Platform::find_owning_pid`] and [`Platform::list_listening`].

pub mod posix;
pub mod windows;

use crate::{port::Protocol, Result};
use tokio::process::Command as TokioCommand;
use tracing::debug;

/// A listening socket found in a listing utility's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListeningSocket {
    pub port: u16,
    /// `None` when the utility could not attribute the socket to a process,
    /// typically because it belongs to another user.
    pub pid: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
    Unsupported(String),
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "linux" | "macos" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Platform::Posix,
            other => Platform::Unsupported(other.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported(_))
    }

    /// Finds the PID of the process listening on `port`, first match wins.
    ///
    /// `Ok(None)` means the utility ran but attributed no process to the
    /// port. `Err` means the utility itself could not be used.
    pub async fn find_owning_pid(&self, port: u16, protocol: Protocol) -> Result<Option<u32>> {
        let sockets = match self {
            Platform::Posix => posix::find_sockets(port, protocol).await?,
            Platform::Windows => windows::find_sockets(port, protocol).await?,
            Platform::Unsupported(os) => {
                return Err(crate::Error::UnsupportedPlatform(os.clone()));
            }
        };

        let pid = sockets
            .iter()
            .filter(|socket| socket.port == port)
            .find_map(|socket| socket.pid);
        debug!(port, ?pid, "resolved owning process");
        Ok(pid)
    }

    /// Lists every listening TCP socket on the machine, in utility order.
    pub async fn list_listening(&self) -> Result<Vec<ListeningSocket>> {
        match self {
            Platform::Posix => posix::list_sockets(Protocol::Tcp).await,
            Platform::Windows => windows::list_sockets(Protocol::Tcp).await,
            Platform::Unsupported(os) => Err(crate::Error::UnsupportedPlatform(os.clone())),
        }
    }
}

/// Runs a listing utility and returns its stdout.
///
/// A non-zero exit with empty stdout and stderr is treated as "nothing
/// matched" (`lsof` reports an empty result that way).
pub(crate) async fn run_utility(program: &str, args: &[&str]) -> Result<String> {
    debug!(program, ?args, "running listing utility");

    let output = TokioCommand::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| crate::Error::CommandFailed(format!("{program} command failed: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stdout.trim().is_empty() && stderr.trim().is_empty() {
        return Ok(String::new());
    }

    Err(crate::Error::CommandFailed(format!(
        "{program} failed: {}",
        stderr.trim()
    )))
}

/// Extracts the port from a local-address column.
///
/// Handles `0.0.0.0:80`, `[::]:80`, `*:80`, `127.0.0.53%lo:53` and the
/// BSD-style `*.80`.
pub(crate) fn port_of(address: &str) -> Option<u16> {
    let (_, port) = address
        .rsplit_once(':')
        .or_else(|| address.rsplit_once('.'))?;
    port.parse::<u16>().ok().filter(|port| *port > 0)
}
