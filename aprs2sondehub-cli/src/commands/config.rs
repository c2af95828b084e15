//! Configuration management CLI commands.
//!
//! Provides `config init` to write a commented default configuration and
//! `config path` to show where it is read from.

use std::path::Path;

use aprs2sondehub::config::{ConfigFile, ConfigFileError};
use clap::Subcommand;

use crate::error::CliError;
use crate::runner::resolve_config_path;

/// Starter server list written next to a new config.
const STARTER_SERVERS: &str = "euro.aprs2.net\nnoam.aprs2.net\n";

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file
    ///
    /// Also creates the server list and an empty balloon list when they do
    /// not exist yet.
    Init,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = resolve_config_path(config_path);
    match command {
        ConfigCommands::Init => run_init(&path),
        ConfigCommands::Path => run_path(&path),
    }
}

fn run_init(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::ConfigExists(path.to_path_buf()));
    }

    ConfigFile::default().save_to(path)?;
    println!("Wrote {}", path.display());

    let config = ConfigFile::load_from(path)?;
    write_if_missing(&config.aprs.servers_file, STARTER_SERVERS)?;
    write_if_missing(&config.balloons.file, "[]\n")?;

    println!();
    println!("Next steps:");
    println!("  1. Set your callsign in [station]");
    println!("  2. Add balloons to {}", config.balloons.file.display());
    println!("  3. Start the bridge with: aprs2sondehub run");
    Ok(())
}

fn run_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    if !path.exists() {
        println!("(file does not exist - run 'aprs2sondehub config init' to create it)");
    }
    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<(), CliError> {
    if path.exists() {
        return Ok(());
    }
    std::fs::write(path, content).map_err(|e| {
        ConfigFileError::WriteError(format!("{}: {}", path.display(), e))
    })?;
    println!("Wrote {}", path.display());
    Ok(())
}
