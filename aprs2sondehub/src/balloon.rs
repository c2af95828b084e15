//! Balloon definitions and the lookup registry.
//!
//! Balloons are loaded once at startup from a JSON array:
//!
//! ```json
//! [
//!   {
//!     "payload": "SQ2IPS-11",
//!     "hamCallsign": "SQ2IPS-11",
//!     "comment": "LoRa APRS pico balloon",
//!     "detail": "Solar powered, 2 x 0.25W panels",
//!     "device": "LightAPRS-W 2.0",
//!     "launchDate": "2024-05-01T10:00:00Z",
//!     "active": true
//!   }
//! ]
//! ```
//!
//! A balloon without `"active": true` is known but ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DAY_MS: f64 = 86_400_000.0;

/// Errors loading the balloon list.
#[derive(Debug, Error)]
pub enum BalloonError {
    /// The balloon file could not be read.
    #[error("Failed to read balloon file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The balloon file is not a valid JSON balloon list.
    #[error("Failed to parse balloon file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One tracked balloon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalloonConfig {
    /// Payload identifier shown on the tracker.
    pub payload: String,

    /// Source callsign the balloon transmits with.
    pub ham_callsign: String,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub detail: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Launch timestamp as written in the config, echoed to the tracker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<String>,

    #[serde(default)]
    pub active: bool,
}

impl BalloonConfig {
    /// Parsed launch time, if a launch date is set and readable.
    pub fn launched_at(&self) -> Option<DateTime<Utc>> {
        self.launch_date.as_deref().and_then(parse_launch_date)
    }

    /// Whole days between launch and `now`, rounded up.
    pub fn days_aloft(&self, now: DateTime<Utc>) -> Option<u64> {
        let launched = self.launched_at()?;
        let elapsed_ms = (now - launched).num_milliseconds().unsigned_abs();
        Some((elapsed_ms as f64 / DAY_MS).ceil() as u64)
    }
}

/// Parses a launch date.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC)
/// or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_launch_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time.with_timezone(&Utc));
    }
    if let Ok(time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(time.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
}

/// Load the balloon list from a JSON file.
pub fn load_balloons(path: &Path) -> Result<Vec<BalloonConfig>, BalloonError> {
    let content = std::fs::read_to_string(path).map_err(|source| BalloonError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| BalloonError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Balloons indexed by APRS source callsign.
#[derive(Debug, Default)]
pub struct BalloonRegistry {
    by_callsign: HashMap<String, Arc<BalloonConfig>>,
}

impl BalloonRegistry {
    /// Builds the registry. The first entry wins when callsigns repeat.
    pub fn new(balloons: Vec<BalloonConfig>) -> Self {
        let mut by_callsign = HashMap::with_capacity(balloons.len());

        for balloon in balloons {
            if by_callsign.contains_key(&balloon.ham_callsign) {
                tracing::warn!(
                    callsign = %balloon.ham_callsign,
                    payload = %balloon.payload,
                    "Duplicate balloon callsign, keeping the first entry"
                );
                continue;
            }
            by_callsign.insert(balloon.ham_callsign.clone(), Arc::new(balloon));
        }

        Self { by_callsign }
    }

    /// Any balloon with this callsign, active or not.
    pub fn get(&self, callsign: &str) -> Option<&Arc<BalloonConfig>> {
        self.by_callsign.get(callsign)
    }

    /// Callsigns of active balloons, sorted, for the login filter.
    pub fn active_callsigns(&self) -> Vec<String> {
        let mut callsigns: Vec<String> = self
            .by_callsign
            .values()
            .filter(|b| b.active)
            .map(|b| b.ham_callsign.clone())
            .collect();
        callsigns.sort();
        callsigns
    }

    pub fn len(&self) -> usize {
        self.by_callsign.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_callsign.is_empty()
    }
}
