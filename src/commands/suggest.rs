use crate::{
    port::Probe,
    utils::{parse_port, validate_count},
    PortReport, Status,
};
use tracing::debug;

pub const DEFAULT_SUGGESTION_COUNT: usize = 4;

pub struct SuggestCommand;

impl SuggestCommand {
    /// Scans upward from `start` until `count` free ports are found or the
    /// port space runs out. Ports are probed one at a time, in order.
    pub async fn execute<P: Probe>(probe: &P, start: &str, count: usize) -> PortReport {
        let Ok(start) = parse_port(start) else {
            return PortReport::error(None, "Invalid start port");
        };
        if let Err(e) = validate_count(count) {
            return PortReport::error(None, e.to_string());
        }

        // never more than the ports left above `start`
        let remaining = usize::from(u16::MAX - start) + 1;
        let mut ports = Vec::with_capacity(count.min(remaining));
        for port in start..=u16::MAX {
            if ports.len() >= count {
                break;
            }
            let report = probe.check(port).await;
            debug!(port, status = ?report.status, "suggest probe");
            if report.status == Status::Free {
                ports.push(port);
            }
        }

        if ports.is_empty() {
            return PortReport::error(None, "No free ports found");
        }

        PortReport {
            ports: Some(ports),
            ..PortReport::new(None, Status::Success)
        }
    }
}
