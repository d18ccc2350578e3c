use crate::{
    commands::CheckCommand,
    port::Probe,
    process::{ProcessLookup, ProcessTable},
    PortReport, Status,
};
use tracing::warn;

pub struct InfoCommand;

impl InfoCommand {
    pub async fn execute<P: Probe>(probe: &P, input: &str) -> PortReport {
        let report = CheckCommand::execute(probe, input).await;
        if !report.is_in_use() || report.pid.is_none() {
            return Self::not_in_use(&report);
        }

        match ProcessTable::load_sampled().await {
            Ok(table) => Self::describe(&report, &table),
            Err(e) => {
                warn!("Error getting process info: {e}");
                PortReport::error(report.port, format!("Failed to get process info: {e}"))
            }
        }
    }

    /// Turns an `in-use` check result into a detailed `success` report.
    pub fn describe<L: ProcessLookup>(report: &PortReport, lookup: &L) -> PortReport {
        let Some(pid) = report.pid.filter(|_| report.is_in_use()) else {
            return Self::not_in_use(report);
        };

        match lookup.details(pid) {
            Some(details) => PortReport {
                info: Some(details),
                ..PortReport::new(report.port, Status::Success)
            },
            None => PortReport::error(report.port, "Process not found"),
        }
    }

    fn not_in_use(report: &PortReport) -> PortReport {
        PortReport::error(report.port, "Port is not in use or no process found")
    }
}
