//! Configuration loaded from `~/.aprs2sondehub/config.ini`.
//!
//! Settings structs live in [`settings`], constants in [`defaults`],
//! parsing in `parser` and serialization in `writer`.
//!
//! # Example
//!
//! ```no_run
//! use aprs2sondehub::config::ConfigFile;
//!
//! let config = ConfigFile::load().unwrap();
//! let servers = config.load_servers().unwrap();
//! let pipeline = config.pipeline_config();
//! ```

pub mod defaults;
mod file;
mod parser;
pub mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, load_servers, ConfigFileError};
pub use settings::{
    AprsSettings, BalloonSettings, ConfigFile, LoggingSettings, SondehubSettings,
    StationSettings, ThrottleSettings,
};
