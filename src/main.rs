use anyhow::Context;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use portpeek::{
    cli::{Cli, Commands},
    commands::{
        AssumeYes, CheckCommand, InfoCommand, KillCommand, ListCommand, SuggestCommand,
        TerminalConfirmation, WatchCommand,
    },
    logging::setup_logging,
    output::Reporter,
    platform::Platform,
    port::{PortProber, Protocol},
    process::ProcessManager,
    PortReport,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red());
            std::process::exit(1);
        }
    }
}

/// Returns whether every emitted report was a non-failure.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let protocol: Protocol = cli.protocol.parse()?;
    let platform = Platform::current();
    let prober = PortProber::new(platform.clone(), protocol);
    let reporter = Reporter::new(cli.json, cli.quiet, cli.log.clone());
    let interactive = !cli.json && !cli.quiet;

    let reports = match cli.command {
        Some(Commands::Suggest { port, count }) => {
            vec![SuggestCommand::execute(&prober, &port, count).await]
        }
        Some(Commands::Kill { port, yes }) => {
            let manager = ProcessManager::new(platform);
            let report = if yes {
                KillCommand::execute(&prober, &manager, &AssumeYes, &port).await
            } else {
                KillCommand::execute(&prober, &manager, &TerminalConfirmation, &port).await
            };
            vec![report]
        }
        Some(Commands::Info { port }) => vec![InfoCommand::execute(&prober, &port).await],
        Some(Commands::List) => {
            let reports = list(&platform, interactive).await;
            reporter
                .emit_all(&reports)
                .context("failed to write output")?;
            return Ok(succeeded(&reports));
        }
        None if cli.ports.is_empty() => {
            Cli::print_help()?;
            return Ok(true);
        }
        None if cli.watch => return watch(&prober, &cli.ports, &reporter, interactive).await,
        None => {
            let mut reports = Vec::with_capacity(cli.ports.len());
            for port in &cli.ports {
                reports.push(CheckCommand::execute(&prober, port).await);
            }
            reports
        }
    };

    for report in &reports {
        reporter.emit(report).context("failed to write output")?;
    }
    Ok(succeeded(&reports))
}

async fn list(platform: &Platform, interactive: bool) -> Vec<PortReport> {
    let spinner = if interactive {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("Scanning listening ports...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let reports = ListCommand::execute(platform).await;
    spinner.finish_and_clear();
    reports
}

async fn watch(
    prober: &PortProber,
    ports: &[String],
    reporter: &Reporter,
    interactive: bool,
) -> anyhow::Result<bool> {
    let Some(port) = ports.first() else {
        return Ok(true);
    };
    if ports.len() > 1 {
        warn!("--watch follows a single port; ignoring {}", ports[1..].join(", "));
    }
    if interactive {
        println!(
            "{}",
            format!("Watching port {port}... Press Ctrl+C to stop").cyan()
        );
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut ok = true;
    WatchCommand::default()
        .execute(prober, port, cancel, |report| {
            ok &= !report.status.is_failure();
            if let Err(e) = reporter.emit(report) {
                warn!("Error writing output: {e}");
            }
        })
        .await;

    Ok(ok)
}

fn succeeded(reports: &[PortReport]) -> bool {
    reports.iter().all(|report| !report.status.is_failure())
}
