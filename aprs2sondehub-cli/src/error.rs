//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and the exit code.

use std::fmt;
use std::path::PathBuf;
use std::process;

use aprs2sondehub::config::ConfigFileError;
use aprs2sondehub::fleet::FleetError;
use aprs2sondehub::sondehub::SinkError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration, server list or balloon list could not be loaded
    Config(ConfigFileError),
    /// Config file already exists
    ConfigExists(PathBuf),
    /// Failed to build the SondeHub client
    Sink(SinkError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to render a record as JSON
    Encode(serde_json::Error),
    /// The APRS-IS fleet stopped with an error
    Fleet(FleetError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(ConfigFileError::ServersError { .. }) => {
                eprintln!();
                eprintln!("List APRS-IS servers one per line, for example:");
                eprintln!("  euro.aprs2.net");
                eprintln!("  noam.aprs2.net");
            }
            CliError::Fleet(FleetError::MajorityLost { .. }) => {
                eprintln!();
                eprintln!("Most servers refused the connection. Check that the station");
                eprintln!("callsign is valid and that the servers accept logins on the");
                eprintln!("configured port.");
            }
            CliError::ConfigExists(_) => {
                eprintln!();
                eprintln!("Remove it first or edit it directly.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "{}", e),
            CliError::ConfigExists(path) => {
                write!(f, "Config file already exists: {}", path.display())
            }
            CliError::Sink(e) => write!(f, "Failed to create SondeHub client: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Encode(e) => write!(f, "Failed to encode record: {}", e),
            CliError::Fleet(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Sink(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Encode(e) => Some(e),
            CliError::Fleet(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<SinkError> for CliError {
    fn from(e: SinkError) -> Self {
        CliError::Sink(e)
    }
}

impl From<FleetError> for CliError {
    fn from(e: FleetError) -> Self {
        CliError::Fleet(e)
    }
}
