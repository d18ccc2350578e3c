use crate::{
    port::Probe,
    process::Terminate,
    utils::parse_port,
    PortReport, Result, Status,
};
use dialoguer::Confirm;
use tracing::error;

/// Asks the operator a yes/no question.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> Result<bool>,
{
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self(prompt)
    }
}

/// Interactive terminal prompt, answering "no" by default.
pub struct TerminalConfirmation;

impl Confirmation for TerminalConfirmation {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
    }
}

/// Skips the prompt, as with `--yes`.
pub struct AssumeYes;

impl Confirmation for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

pub struct KillCommand;

impl KillCommand {
    /// Terminates the process holding `input` once the operator agrees.
    ///
    /// The PID is not re-read between the check and the signal; a process
    /// that replaced the original owner in that window gets the signal.
    pub async fn execute<P, T, C>(probe: &P, terminator: &T, confirmation: &C, input: &str) -> PortReport
    where
        P: Probe,
        T: Terminate,
        C: Confirmation,
    {
        let port = match parse_port(input) {
            Ok(port) => port,
            Err(e) => return PortReport::error(None, e.to_string()),
        };

        let report = probe.check(port).await;
        let pid = match (report.status, report.pid) {
            (Status::InUse, Some(pid)) => pid,
            _ => {
                return PortReport::error(Some(port), "Port is not in use or no process found");
            }
        };

        let prompt = format!("Kill process {pid} using port {port}?");
        match confirmation.confirm(&prompt) {
            Ok(true) => {}
            Ok(false) => {
                return PortReport::new(Some(port), Status::Aborted)
                    .with_message("Kill operation cancelled");
            }
            Err(e) => {
                return PortReport::error(Some(port), format!("Failed to read confirmation: {e}"));
            }
        }

        match terminator.terminate(pid).await {
            Ok(()) => PortReport::new(Some(port), Status::Success)
                .with_message(format!("Process {pid} killed")),
            Err(e) => {
                error!("Error killing process {pid}: {e}");
                PortReport::error(Some(port), format!("Failed to kill process: {e}"))
            }
        }
    }
}
