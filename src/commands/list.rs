use crate::{
    platform::{ListeningSocket, Platform},
    process::{ProcessLookup, ProcessTable},
    PortReport,
};
use std::collections::BTreeMap;
use tracing::warn;

pub struct ListCommand;

impl ListCommand {
    /// Lists every listening TCP port, ascending, one report per port.
    ///
    /// Failures collapse into a single `error` report.
    pub async fn execute(platform: &Platform) -> Vec<PortReport> {
        if let Platform::Unsupported(os) = platform {
            return vec![PortReport::error(None, format!("Unsupported platform: {os}"))];
        }

        let sockets = match platform.list_listening().await {
            Ok(sockets) => sockets,
            Err(e) => {
                warn!("Error listing ports: {e}");
                return vec![PortReport::error(None, format!("Failed to list ports: {e}"))];
            }
        };

        let table = match ProcessTable::load().await {
            Ok(table) => Some(table),
            Err(e) => {
                warn!("Error reading process table: {e}");
                None
            }
        };

        Self::collate(sockets, &table)
    }

    /// Deduplicates by port (first occurrence wins), sorts ascending and
    /// attaches process names.
    pub fn collate<L: ProcessLookup>(sockets: Vec<ListeningSocket>, lookup: &L) -> Vec<PortReport> {
        let mut owners: BTreeMap<u16, Option<u32>> = BTreeMap::new();
        for socket in sockets {
            owners.entry(socket.port).or_insert(socket.pid);
        }

        if owners.is_empty() {
            return vec![PortReport::error(None, "No listening ports found")];
        }

        owners
            .into_iter()
            .map(|(port, pid)| match pid {
                Some(pid) => {
                    let name = lookup.name_of(pid).unwrap_or_else(|| "unknown".to_string());
                    PortReport::in_use(port).with_process(pid, name)
                }
                None => PortReport {
                    process_name: Some("unknown".to_string()),
                    ..PortReport::in_use(port)
                },
            })
            .collect()
    }
}
