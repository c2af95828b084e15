//! `ConfigFile` → commented INI text written by `config init`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[station]
; Callsign used to log in to APRS-IS. The passcode is derived from it.
callsign = {}

[aprs]
; File listing APRS-IS server hostnames, one per line (relative to this file)
servers_file = {}
; Filtered feed port (default: 14580)
port = {}
; A session closing within this many seconds counts as a rejection and the
; server is dropped for the rest of the run (default: 10)
reject_threshold_secs = {}
; Seconds to wait before reconnecting a dropped session (default: 15)
reconnect_delay_secs = {}
; Comma-separated source callsigns whose packets are always ignored
ignored_stations = {}

[balloons]
; JSON list of tracked balloons (relative to this file)
file = {}

[sondehub]
; SondeHub API base URL
api_url = {}
; Tracker base URL, the payload id is appended for status beacons
tracker_url = {}
; Mark uploads as development data (default: false)
dev = {}

[throttle]
; Drop packets from a receiver heard again within this window (default: 30)
receiver_window_secs = {}
; Minimum seconds between status beacons per payload (default: 900)
status_interval_secs = {}
; Minimum seconds between telemetry frames per balloon (default: 30)
telemetry_interval_secs = {}

[logging]
; Log file, cleared on every start
file = {}
"#,
        config.station.callsign,
        path_to_string(&config.aprs.servers_file),
        config.aprs.port,
        config.aprs.reject_threshold_secs,
        config.aprs.reconnect_delay_secs,
        config.aprs.ignored_stations.join(", "),
        path_to_string(&config.balloons.file),
        config.sondehub.api_url,
        config.sondehub.tracker_url,
        config.sondehub.dev,
        config.throttle.receiver_window_secs,
        config.throttle.status_interval_secs,
        config.throttle.telemetry_interval_secs,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
