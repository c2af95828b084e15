//! Configuration file handling for ~/.aprs2sondehub/config.ini.
//!
//! Loads and saves the INI file and reads the two files it points at: the
//! server list and the balloon list.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;
use crate::balloon::{load_balloons, BalloonConfig, BalloonError};

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),

    /// Failed to read the server list
    #[error("Failed to read server list {path}: {source}")]
    ServersError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load the balloon list
    #[error(transparent)]
    BalloonsError(#[from] BalloonError),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.aprs2sondehub/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults. Relative server and
    /// balloon file paths are resolved against the file's directory.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        let mut config = if path.exists() {
            let ini = Ini::load_from_file(path)?;
            super::parser::parse_ini(&ini)?
        } else {
            Self::default()
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.aprs.servers_file = base.join(&config.aprs.servers_file);
        config.balloons.file = base.join(&config.balloons.file);

        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Reads the APRS-IS server list.
    pub fn load_servers(&self) -> Result<Vec<String>, ConfigFileError> {
        load_servers(&self.aprs.servers_file)
    }

    /// Reads the balloon list.
    pub fn load_balloons(&self) -> Result<Vec<BalloonConfig>, ConfigFileError> {
        Ok(load_balloons(&self.balloons.file)?)
    }
}

/// Reads a newline-delimited server list, skipping blank lines.
pub fn load_servers(path: &Path) -> Result<Vec<String>, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::ServersError {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Get the path to the config directory (~/.aprs2sondehub).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aprs2sondehub")
}

/// Get the path to the config file (~/.aprs2sondehub/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
