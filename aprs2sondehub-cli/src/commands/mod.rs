//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, path)
//! - [`parse`] - Dry-run one APRS line through the parser and pipeline
//! - [`passcode`] - Print the APRS-IS passcode for a callsign
//! - [`run`] - Main command (bridge APRS-IS to SondeHub)

pub mod config;
pub mod parse;
pub mod passcode;
pub mod run;
