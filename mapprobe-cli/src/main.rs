//! mapprobe CLI - Command-line interface
//!
//! This binary provides a command-line interface to the mapprobe library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::classify::ClassifyArgs;
use commands::config::ConfigCommands;
use commands::inspect::InspectArgs;
use commands::locate::LocateArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "mapprobe")]
#[command(version = mapprobe::VERSION)]
#[command(about = "Point queries over layered map data", long_about = None)]
struct Cli {
    /// Config file (default: ~/.mapprobe/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also print log events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print mesh codes, world grid key and grid index for a coordinate
    Locate(LocateArgs),

    /// Classify the properties of a GeoJSON file
    Classify(ClassifyArgs),

    /// Run a full query: codes, layer values, feature matches and content
    Inspect(InspectArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config { command } => commands::config::run(command, config_path),
        Commands::Locate(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::locate::run(args, &runner)
        }
        Commands::Classify(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::classify::run(args, &runner)
        }
        Commands::Inspect(args) => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::inspect::run(args, &runner).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["mapprobe", "locate", "35.6", "139.7", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Locate(_)));
    }

    #[test]
    fn test_parse_config_subcommand() {
        let cli = Cli::parse_from(["mapprobe", "--config", "/tmp/m.ini", "config", "init", "--force"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/m.ini")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Init { force: true }
            }
        ));
    }
}
