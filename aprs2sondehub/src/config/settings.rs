//! Settings structs, one per `[section]` of config.ini.

use std::path::PathBuf;
use std::time::Duration;

use crate::fleet::FleetConfig;
use crate::pipeline::PipelineConfig;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub station: StationSettings,
    pub aprs: AprsSettings,
    pub balloons: BalloonSettings,
    pub sondehub: SondehubSettings,
    pub throttle: ThrottleSettings,
    pub logging: LoggingSettings,
}

/// Station identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSettings {
    /// Callsign used to log in to APRS-IS.
    pub callsign: String,
}

/// APRS-IS connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AprsSettings {
    /// Newline-delimited list of server hostnames
    pub servers_file: PathBuf,
    /// Port used for every server
    pub port: u16,
    /// Sessions closing sooner than this count as rejections
    pub reject_threshold_secs: u64,
    /// Delay before reconnecting a dropped session
    pub reconnect_delay_secs: u64,
    /// Source callsigns whose packets are always dropped
    pub ignored_stations: Vec<String>,
}

/// Balloon list location.
#[derive(Debug, Clone, PartialEq)]
pub struct BalloonSettings {
    /// JSON balloon list
    pub file: PathBuf,
}

/// SondeHub settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SondehubSettings {
    /// API base URL
    pub api_url: String,
    /// Tracker base URL used in status beacons
    pub tracker_url: String,
    /// Flag uploads as development data
    pub dev: bool,
}

/// Throttle windows, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleSettings {
    pub receiver_window_secs: u64,
    pub status_interval_secs: u64,
    pub telemetry_interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl ConfigFile {
    /// Pipeline settings derived from `[throttle]` and `[sondehub]`.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            receiver_window: Duration::from_secs(self.throttle.receiver_window_secs),
            status_interval: Duration::from_secs(self.throttle.status_interval_secs),
            telemetry_interval: Duration::from_secs(self.throttle.telemetry_interval_secs),
            tracker_url: self.sondehub.tracker_url.clone(),
            dev: self.sondehub.dev,
        }
    }

    /// Session policy derived from `[aprs]`.
    pub fn fleet_config(&self) -> FleetConfig {
        FleetConfig {
            port: self.aprs.port,
            reject_threshold: Duration::from_secs(self.aprs.reject_threshold_secs),
            reconnect_delay: Duration::from_secs(self.aprs.reconnect_delay_secs),
        }
    }
}
