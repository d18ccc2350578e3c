use crate::{PortReport, Result, Status};
use chrono::{DateTime, SecondsFormat, Utc};
use colored::Colorize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Renders reports to stdout and, optionally, appends them to a log file.
pub struct Reporter {
    json: bool,
    quiet: bool,
    log_file: Option<PathBuf>,
}

impl Reporter {
    pub fn new(json: bool, quiet: bool, log_file: Option<PathBuf>) -> Self {
        Self {
            json,
            quiet,
            log_file,
        }
    }

    pub fn emit(&self, report: &PortReport) -> Result<()> {
        let rendered = if self.json {
            serde_json::to_string_pretty(report)?
        } else {
            format_report(report)
        };

        if !self.quiet {
            if self.json {
                println!("{rendered}");
            } else {
                println!("{}", paint(report, &rendered));
            }
        }

        self.log(&rendered)
    }

    pub fn emit_all(&self, reports: &[PortReport]) -> Result<()> {
        let rendered = if self.json {
            serde_json::to_string_pretty(reports)?
        } else {
            format_reports(reports)
        };

        if !self.quiet {
            if self.json {
                println!("{rendered}");
            } else {
                for report in reports {
                    println!("{}", paint(report, &format_report(report)));
                }
            }
        }

        self.log(&rendered)
    }

    fn log(&self, rendered: &str) -> Result<()> {
        match &self.log_file {
            Some(path) => append_log(path, rendered, Utc::now()),
            None => Ok(()),
        }
    }
}

/// Plain-text rendering of one report.
pub fn format_report(report: &PortReport) -> String {
    let port = report
        .port
        .map(|port| port.to_string())
        .unwrap_or_else(|| "?".to_string());

    if let Some(info) = &report.info {
        return format!(
            "Port {port} info:\nName: {}\nPID: {}\nMemory: {:.2} MB\nCPU: {:.2}%\nCommand: {}",
            info.name,
            info.pid,
            info.memory,
            info.cpu,
            info.command.as_deref().unwrap_or("N/A")
        );
    }
    if let Some(ports) = &report.ports {
        let ports: Vec<String> = ports.iter().map(|p| p.to_string()).collect();
        return format!("Free ports: {}", ports.join(", "));
    }

    match report.status {
        Status::InUse => format!(
            "Port {port} is in use by {} (PID {})",
            report.process_name.as_deref().unwrap_or("unknown"),
            report
                .pid
                .map(|pid| pid.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        ),
        Status::Free => format!("Port {port} is free"),
        Status::Invalid => report
            .message
            .clone()
            .unwrap_or_else(|| "Invalid port".to_string()),
        Status::Error => format!(
            "Error: {}",
            report.message.as_deref().unwrap_or("Unknown error")
        ),
        _ => report
            .message
            .clone()
            .unwrap_or_else(|| format!("Port {port}: {}", report.status)),
    }
}

/// Plain-text rendering of a list, one report per line.
pub fn format_reports(reports: &[PortReport]) -> String {
    reports
        .iter()
        .map(format_report)
        .collect::<Vec<_>>()
        .join("\n")
}

fn paint(report: &PortReport, text: &str) -> String {
    if report.info.is_some() {
        return text.cyan().to_string();
    }
    match report.status {
        Status::InUse | Status::Invalid | Status::Error => text.red().to_string(),
        Status::Free | Status::Success => text.green().to_string(),
        _ => text.yellow().to_string(),
    }
}

/// Appends `<timestamp> - <rendered>` to `path`, creating it if needed.
pub fn append_log(path: &Path, rendered: &str, at: DateTime<Utc>) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    write!(
        file,
        "{} - {rendered}{LINE_ENDING}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )?;
    Ok(())
}
