use crate::{report::round2, ProcessDetails, Result};
use sysinfo::{Pid, System};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Read access to the OS process table.
pub trait ProcessLookup {
    fn details(&self, pid: u32) -> Option<ProcessDetails>;

    fn name_of(&self, pid: u32) -> Option<String> {
        self.details(pid).map(|details| details.name)
    }
}

impl<L: ProcessLookup> ProcessLookup for Option<L> {
    fn details(&self, pid: u32) -> Option<ProcessDetails> {
        self.as_ref().and_then(|lookup| lookup.details(pid))
    }
}

/// A snapshot of the process table taken with `sysinfo`.
pub struct ProcessTable {
    system: System,
}

impl ProcessTable {
    /// Takes a single snapshot. Good enough for names and memory; CPU
    /// figures read as zero.
    pub fn snapshot() -> Self {
        Self {
            system: System::new_all(),
        }
    }

    /// Takes two snapshots separated by the minimum CPU refresh interval so
    /// that CPU usage is meaningful.
    pub fn sampled() -> Self {
        let mut system = System::new_all();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        system.refresh_all();
        Self { system }
    }

    /// [`ProcessTable::snapshot`] off the async runtime.
    pub async fn load() -> Result<Self> {
        tokio::task::spawn_blocking(Self::snapshot)
            .await
            .map_err(|e| crate::Error::Other(format!("process table refresh failed: {e}")))
    }

    /// [`ProcessTable::sampled`] off the async runtime.
    pub async fn load_sampled() -> Result<Self> {
        tokio::task::spawn_blocking(Self::sampled)
            .await
            .map_err(|e| crate::Error::Other(format!("process table refresh failed: {e}")))
    }
}

impl ProcessLookup for ProcessTable {
    fn details(&self, pid: u32) -> Option<ProcessDetails> {
        self.system.process(Pid::from_u32(pid)).map(|process| {
            let command = process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join(" ");

            ProcessDetails {
                name: process.name().to_string_lossy().to_string(),
                pid,
                memory: round2(process.memory() as f64 / BYTES_PER_MB),
                cpu: round2(f64::from(process.cpu_usage())),
                command: (!command.is_empty()).then_some(command),
            }
        })
    }
}
