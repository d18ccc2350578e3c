pub mod table;

pub use table::{ProcessLookup, ProcessTable};

use crate::{platform::Platform, Result};
use std::future::Future;
use tokio::process::Command as TokioCommand;
use tracing::debug;

/// Forcibly terminates a process.
pub trait Terminate {
    fn terminate(&self, pid: u32) -> impl Future<Output = Result<()>> + Send;
}

pub struct ProcessManager {
    platform: Platform,
}

impl ProcessManager {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Sends `SIGKILL` on POSIX and runs `taskkill /F` on Windows.
    pub async fn kill_process(&self, pid: u32) -> Result<()> {
        match &self.platform {
            Platform::Posix => self.kill_process_unix(pid).await,
            Platform::Windows => self.kill_process_windows(pid).await,
            Platform::Unsupported(os) => Err(crate::Error::UnsupportedPlatform(os.clone())),
        }
    }

    async fn kill_process_unix(&self, pid: u32) -> Result<()> {
        debug!(pid, "sending SIGKILL");
        let output = TokioCommand::new("kill")
            .arg("-9")
            .arg(pid.to_string())
            .output()
            .await
            .map_err(|e| crate::Error::CommandFailed(format!("kill command failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No such process") {
                return Err(crate::Error::ProcessNotFound(pid));
            } else if stderr.contains("Operation not permitted") {
                return Err(crate::Error::PermissionDenied(format!(
                    "not allowed to signal process {pid}"
                )));
            }
            return Err(crate::Error::CommandFailed(format!(
                "kill -9 {pid} failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }

    async fn kill_process_windows(&self, pid: u32) -> Result<()> {
        debug!(pid, "running taskkill");
        let output = TokioCommand::new("taskkill")
            .arg("/PID")
            .arg(pid.to_string())
            .arg("/F")
            .output()
            .await
            .map_err(|e| crate::Error::CommandFailed(format!("taskkill command failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("not found") {
                return Err(crate::Error::ProcessNotFound(pid));
            } else if stderr.contains("Access is denied") {
                return Err(crate::Error::PermissionDenied(format!(
                    "not allowed to terminate process {pid}"
                )));
            }
            return Err(crate::Error::CommandFailed(format!(
                "taskkill /PID {pid} /F failed: {}",
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

impl Terminate for ProcessManager {
    fn terminate(&self, pid: u32) -> impl Future<Output = Result<()>> + Send {
        self.kill_process(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_kill_process_non_existent() {
        let process_manager = ProcessManager::default();

        // above the largest pid_max any kernel allows
        let result = process_manager.kill_process(99_999_999).await;
        assert!(result.is_err());

        match result.unwrap_err() {
            crate::Error::ProcessNotFound(pid) => assert_eq!(pid, 99_999_999),
            // kill(1) wording differs between shells and platforms
            e => assert!(!e.to_string().is_empty()),
        }
    }

    #[tokio::test]
    async fn test_kill_process_unsupported_platform() {
        let process_manager = ProcessManager::new(Platform::Unsupported("plan9".to_string()));

        let result = process_manager.kill_process(1234).await;
        assert!(matches!(result, Err(crate::Error::UnsupportedPlatform(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_kill_process_terminates_child() {
        let mut child = TokioCommand::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id().unwrap();

        match ProcessManager::new(Platform::Posix).terminate(pid).await {
            Ok(()) => {
                let status = child.wait().await.unwrap();
                assert!(!status.success());
            }
            Err(e) => {
                // minimal images may ship without kill(1)
                child.kill().await.unwrap();
                assert!(matches!(e, crate::Error::CommandFailed(_)));
            }
        }
    }
}
