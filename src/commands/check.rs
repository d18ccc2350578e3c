use crate::{port::Probe, utils::parse_port, PortReport};

pub struct CheckCommand;

impl CheckCommand {
    /// Validates `input` and probes it. Bad input yields an `invalid` report.
    pub async fn execute<P: Probe>(probe: &P, input: &str) -> PortReport {
        match parse_port(input) {
            Ok(port) => probe.check(port).await,
            Err(e) => PortReport::invalid(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::FakeProbe;
    use crate::Status;

    #[tokio::test]
    async fn test_check_invalid_inputs() {
        let probe = FakeProbe::all_free();

        for input in ["0", "65536", "-5", "abc", "", "80a", "99999999999"] {
            let report = CheckCommand::execute(&probe, input).await;
            assert_eq!(report.status, Status::Invalid, "input {input:?}");
            assert!(report.port.is_none());
            assert!(report
                .message
                .unwrap()
                .contains("Port must be between 1 and 65535"));
        }
        assert!(probe.checked().is_empty());
    }

    #[tokio::test]
    async fn test_check_delegates_to_probe() {
        let probe = FakeProbe::busy(&[(3000, Some(4242))]);

        let report = CheckCommand::execute(&probe, "3000").await;
        assert_eq!(report.status, Status::InUse);
        assert_eq!(report.pid, Some(4242));

        let report = CheckCommand::execute(&probe, "3001").await;
        assert_eq!(report.status, Status::Free);
        assert_eq!(probe.checked(), vec![3000, 3001]);
    }
}
