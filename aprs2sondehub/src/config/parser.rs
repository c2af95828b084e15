//! INI → `ConfigFile`. The single place where key names map to fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
/// Unknown sections and keys are ignored.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [station]
    if let Some(section) = ini.section(Some("station")) {
        if let Some(v) = non_empty(section, "callsign") {
            config.station.callsign = v.to_uppercase();
        }
    }

    // [aprs]
    if let Some(section) = ini.section(Some("aprs")) {
        if let Some(v) = non_empty(section, "servers_file") {
            config.aprs.servers_file = expand_tilde(v);
        }
        if let Some(v) = parse_number(section, "aprs", "port", "must be a port number (1-65535)")? {
            if v == 0 {
                return Err(invalid("aprs", "port", "0", "must be a port number (1-65535)"));
            }
            config.aprs.port = v;
        }
        if let Some(v) = parse_number(
            section,
            "aprs",
            "reject_threshold_secs",
            "must be a non-negative integer (seconds)",
        )? {
            config.aprs.reject_threshold_secs = v;
        }
        if let Some(v) = parse_number(
            section,
            "aprs",
            "reconnect_delay_secs",
            "must be a non-negative integer (seconds)",
        )? {
            config.aprs.reconnect_delay_secs = v;
        }
        if let Some(v) = section.get("ignored_stations") {
            config.aprs.ignored_stations = parse_list(v);
        }
    }

    // [balloons]
    if let Some(section) = ini.section(Some("balloons")) {
        if let Some(v) = non_empty(section, "file") {
            config.balloons.file = expand_tilde(v);
        }
    }

    // [sondehub]
    if let Some(section) = ini.section(Some("sondehub")) {
        if let Some(v) = non_empty(section, "api_url") {
            config.sondehub.api_url = v.to_string();
        }
        if let Some(v) = non_empty(section, "tracker_url") {
            config.sondehub.tracker_url = v.to_string();
        }
        if let Some(v) = section.get("dev") {
            config.sondehub.dev = parse_bool(v).ok_or_else(|| {
                invalid("sondehub", "dev", v, "must be true or false")
            })?;
        }
    }

    // [throttle]
    if let Some(section) = ini.section(Some("throttle")) {
        let reason = "must be a non-negative integer (seconds)";
        if let Some(v) = parse_number(section, "throttle", "receiver_window_secs", reason)? {
            config.throttle.receiver_window_secs = v;
        }
        if let Some(v) = parse_number(section, "throttle", "status_interval_secs", reason)? {
            config.throttle.status_interval_secs = v;
        }
        if let Some(v) = parse_number(section, "throttle", "telemetry_interval_secs", reason)? {
            config.throttle.telemetry_interval_secs = v;
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    let Some(v) = non_empty(section, key) else {
        return Ok(None);
    };
    v.parse()
        .map(Some)
        .map_err(|_| invalid(section_name, key, v, reason))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses a boolean value; `None` if it is not one.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits a comma-separated list, dropping empty entries.
pub(super) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_full_config() {
        let config = load(
            r#"
[station]
callsign = sq2ips

[aprs]
servers_file = /etc/aprs/servers.txt
port = 10152
reject_threshold_secs = 5
reconnect_delay_secs = 60
ignored_stations = SR9BAD, SP0XYZ-10 ,

[balloons]
file = /etc/aprs/balloons.json

[sondehub]
api_url = http://localhost:8080
tracker_url = https://example.test/
dev = yes

[throttle]
receiver_window_secs = 45
status_interval_secs = 600
telemetry_interval_secs = 120

[logging]
file = /var/log/aprs2sondehub.log
"#,
        )
        .unwrap();

        assert_eq!(config.station.callsign, "SQ2IPS");
        assert_eq!(config.aprs.servers_file, PathBuf::from("/etc/aprs/servers.txt"));
        assert_eq!(config.aprs.port, 10152);
        assert_eq!(config.aprs.reject_threshold_secs, 5);
        assert_eq!(config.aprs.reconnect_delay_secs, 60);
        assert_eq!(config.aprs.ignored_stations, vec!["SR9BAD", "SP0XYZ-10"]);
        assert_eq!(config.balloons.file, PathBuf::from("/etc/aprs/balloons.json"));
        assert_eq!(config.sondehub.api_url, "http://localhost:8080");
        assert_eq!(config.sondehub.tracker_url, "https://example.test/");
        assert!(config.sondehub.dev);
        assert_eq!(config.throttle.receiver_window_secs, 45);
        assert_eq!(config.throttle.status_interval_secs, 600);
        assert_eq!(config.throttle.telemetry_interval_secs, 120);
        assert_eq!(config.logging.file, PathBuf::from("/var/log/aprs2sondehub.log"));
    }

    #[test]
    fn test_missing_sections_keep_defaults() {
        let config = load("[station]\ncallsign = N1CALL\n").unwrap();

        assert_eq!(config.station.callsign, "N1CALL");
        assert_eq!(config.aprs.port, 14580);
        assert_eq!(config.throttle.status_interval_secs, DEFAULT_STATUS_INTERVAL_SECS);
        assert_eq!(config.sondehub.api_url, "https://api.v2.sondehub.org");
        assert!(!config.sondehub.dev);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = load("[aprs]\nfavourite_colour = blue\n[extra]\nkey = value\n").unwrap();
        assert_eq!(config.aprs.port, 14580);
    }

    #[test]
    fn test_invalid_port() {
        let err = load("[aprs]\nport = eighty\n").unwrap_err();
        assert!(err.to_string().contains("aprs.port"));
        assert!(err.to_string().contains("eighty"));

        let err = load("[aprs]\nport = 0\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));

        let err = load("[aprs]\nport = 70000\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_interval() {
        let err = load("[throttle]\nstatus_interval_secs = -5\n").unwrap_err();
        assert!(err.to_string().contains("throttle.status_interval_secs"));
    }

    #[test]
    fn test_invalid_bool() {
        let err = load("[sondehub]\ndev = maybe\n").unwrap_err();
        assert!(err.to_string().contains("must be true or false"));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" ON "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/logs/a.log"), home.join("logs/a.log"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("relative"), PathBuf::from("relative"));
    }
}
