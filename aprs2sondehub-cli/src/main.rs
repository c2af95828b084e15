//! aprs2sondehub CLI - Command-line interface
//!
//! Runs the APRS-IS to SondeHub bridge and a few helper commands around it.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;

#[derive(Parser)]
#[command(name = "aprs2sondehub")]
#[command(version, about = "Forward balloon telemetry from APRS-IS to SondeHub", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.aprs2sondehub/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug-level logging regardless of RUST_LOG
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to APRS-IS and forward telemetry (default)
    Run,

    /// Print the APRS-IS passcode for a callsign
    Passcode {
        /// Callsign, with or without SSID
        callsign: String,
    },

    /// Show how a single raw APRS-IS line would be handled
    Parse {
        /// The line as received from APRS-IS
        line: String,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(config_path, cli.debug),
        Commands::Passcode { callsign } => commands::passcode::run(&callsign),
        Commands::Parse { line } => commands::parse::run(config_path, &line),
        Commands::Config(command) => commands::config::run(command, config_path),
    };

    if let Err(e) = result {
        e.exit();
    }
}
