use crate::commands::DEFAULT_SUGGESTION_COUNT;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "portpeek",
    about = "A CLI tool to manage and inspect network ports",
    version,
    args_conflicts_with_subcommands = true,
    subcommand_help_heading = "Commands",
    help_template = "{before-help}{name} {version}\n{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(help = "Ports to check")]
    pub ports: Vec<String>,

    #[arg(short, long, help = "Watch port status every 3 seconds")]
    pub watch: bool,

    #[arg(short, long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, value_name = "FILE", help = "Append output to a log file")]
    pub log: Option<PathBuf>,

    #[arg(short, long, global = true, default_value = "tcp", help = "Protocol (tcp/udp)")]
    pub protocol: String,

    #[arg(short, long, global = true, help = "Suppress output")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Suggest free ports starting from the given port")]
    Suggest {
        #[arg(help = "First port to try")]
        port: String,

        #[arg(default_value_t = DEFAULT_SUGGESTION_COUNT, help = "Number of ports to suggest")]
        count: usize,
    },

    #[command(about = "Kill the process using the port")]
    Kill {
        #[arg(help = "Port number used by the process to kill")]
        port: String,

        #[arg(short, long, help = "Kill without confirmation")]
        yes: bool,
    },

    #[command(about = "Show detailed process info for the port")]
    Info {
        #[arg(help = "Port number to inspect")]
        port: String,
    },

    #[command(about = "List all listening TCP ports")]
    List,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn print_help() -> std::io::Result<()> {
        Self::command().print_help()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_ports() {
        let cli = Cli::try_parse_from(["portpeek", "3000", "8080", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.ports, vec!["3000", "8080"]);
        assert!(cli.json);
        assert_eq!(cli.protocol, "tcp");
    }

    #[test]
    fn test_parse_suggest_default_count() {
        let cli = Cli::try_parse_from(["portpeek", "suggest", "3000"]).unwrap();
        match cli.command {
            Some(Commands::Suggest { port, count }) => {
                assert_eq!(port, "3000");
                assert_eq!(count, DEFAULT_SUGGESTION_COUNT);
            }
            _ => panic!("expected suggest"),
        }
    }

    #[test]
    fn test_parse_kill_with_global_flags() {
        let cli =
            Cli::try_parse_from(["portpeek", "kill", "8080", "--yes", "--log", "out.log"]).unwrap();
        match cli.command {
            Some(Commands::Kill { port, yes }) => {
                assert_eq!(port, "8080");
                assert!(yes);
            }
            _ => panic!("expected kill"),
        }
        assert_eq!(cli.log, Some(PathBuf::from("out.log")));
    }

    #[test]
    fn test_list_takes_no_ports() {
        assert!(Cli::try_parse_from(["portpeek", "list", "3000"]).is_err());
    }
}
