//! Default values for every setting and `ConfigFile::default()`.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::aprs::DEFAULT_APRS_IS_PORT;
use crate::pipeline::DEFAULT_TRACKER_URL;
use crate::sondehub::DEFAULT_API_URL;

/// Login callsign until the user sets their own.
pub const DEFAULT_CALLSIGN: &str = "N0CALL";

/// Server list, relative to the config directory.
pub const DEFAULT_SERVERS_FILE: &str = "servers.txt";

/// Balloon list, relative to the config directory.
pub const DEFAULT_BALLOONS_FILE: &str = "balloons.json";

pub const DEFAULT_REJECT_THRESHOLD_SECS: u64 = 10;
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 15;

pub const DEFAULT_RECEIVER_WINDOW_SECS: u64 = 30;
pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 15 * 60;
pub const DEFAULT_TELEMETRY_INTERVAL_SECS: u64 = 30;

/// Log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "aprs2sondehub.log";

/// Default log file path (~/.aprs2sondehub/aprs2sondehub.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            station: StationSettings {
                callsign: DEFAULT_CALLSIGN.to_string(),
            },
            aprs: AprsSettings {
                servers_file: PathBuf::from(DEFAULT_SERVERS_FILE),
                port: DEFAULT_APRS_IS_PORT,
                reject_threshold_secs: DEFAULT_REJECT_THRESHOLD_SECS,
                reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
                ignored_stations: Vec::new(),
            },
            balloons: BalloonSettings {
                file: PathBuf::from(DEFAULT_BALLOONS_FILE),
            },
            sondehub: SondehubSettings {
                api_url: DEFAULT_API_URL.to_string(),
                tracker_url: DEFAULT_TRACKER_URL.to_string(),
                dev: false,
            },
            throttle: ThrottleSettings {
                receiver_window_secs: DEFAULT_RECEIVER_WINDOW_SECS,
                status_interval_secs: DEFAULT_STATUS_INTERVAL_SECS,
                telemetry_interval_secs: DEFAULT_TELEMETRY_INTERVAL_SECS,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
