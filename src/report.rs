use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome carried by every [`PortReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Free,
    InUse,
    Invalid,
    Error,
    Aborted,
    Killed,
    Success,
}

impl Status {
    /// Whether the status should make the binary exit non-zero.
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Error | Status::Invalid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Free => "free",
            Status::InUse => "in-use",
            Status::Invalid => "invalid",
            Status::Error => "error",
            Status::Aborted => "aborted",
            Status::Killed => "killed",
            Status::Success => "success",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detailed information about the process owning a port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDetails {
    pub name: String,
    pub pid: u32,
    /// Resident memory in megabytes, rounded to two decimals.
    pub memory: f64,
    /// CPU utilisation in percent, rounded to two decimals.
    pub cpu: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// The single result record returned by every operation.
///
/// Which optional fields are populated depends on `status`; absent fields
/// are left out of the JSON rendering entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ProcessDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u16>>,
}

impl PortReport {
    pub fn new(port: Option<u16>, status: Status) -> Self {
        Self {
            port,
            status,
            pid: None,
            process_name: None,
            message: None,
            info: None,
            ports: None,
        }
    }

    pub fn free(port: u16) -> Self {
        Self::new(Some(port), Status::Free)
    }

    pub fn in_use(port: u16) -> Self {
        Self::new(Some(port), Status::InUse)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(None, Status::Invalid).with_message(message)
    }

    pub fn error(port: Option<u16>, message: impl Into<String>) -> Self {
        Self::new(port, Status::Error).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_process(mut self, pid: u32, name: impl Into<String>) -> Self {
        self.pid = Some(pid);
        self.process_name = Some(name.into());
        self
    }

    pub fn is_in_use(&self) -> bool {
        self.status == Status::InUse
    }
}

/// Rounds to two decimal places, the precision used for memory and CPU.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&Status::InUse).unwrap(), "\"in-use\"");
        assert_eq!(serde_json::to_string(&Status::Free).unwrap(), "\"free\"");
        assert_eq!(
            serde_json::from_str::<Status>("\"aborted\"").unwrap(),
            Status::Aborted
        );
    }

    #[test]
    fn test_status_display_matches_serde() {
        for status in [Status::Free, Status::InUse, Status::Killed, Status::Success] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let report = PortReport::free(8080);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["port"].as_u64().unwrap(), 8080);
        assert_eq!(json["status"].as_str().unwrap(), "free");
        assert!(json.get("pid").is_none());
        assert!(json.get("processName").is_none());
        assert!(json.get("ports").is_none());
    }

    #[test]
    fn test_process_name_is_camel_case() {
        let report = PortReport::in_use(3000).with_process(4242, "node");
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["pid"].as_u64().unwrap(), 4242);
        assert_eq!(json["processName"].as_str().unwrap(), "node");
    }

    #[test]
    fn test_json_round_trip_preserves_fields() {
        let mut report = PortReport::new(Some(5432), Status::Success);
        report.info = Some(ProcessDetails {
            name: "postgres".to_string(),
            pid: 811,
            memory: 12.5,
            cpu: 0.25,
            command: Some("/usr/lib/postgresql/16/bin/postgres -D /var/lib/pg".to_string()),
        });

        let json = serde_json::to_string_pretty(&report).unwrap();
        let parsed: PortReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);

        let suggestion = PortReport {
            ports: Some(vec![3000, 3001, 3003]),
            ..PortReport::new(None, Status::Success)
        };
        let json = serde_json::to_string(&suggestion).unwrap();
        assert_eq!(serde_json::from_str::<PortReport>(&json).unwrap(), suggestion);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(42.0), 42.0);
    }

    #[test]
    fn test_failure_statuses() {
        assert!(Status::Error.is_failure());
        assert!(Status::Invalid.is_failure());
        assert!(!Status::Aborted.is_failure());
        assert!(!Status::InUse.is_failure());
    }
}
