//! The record uploaded to SondeHub for every accepted packet.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::frequency::{radio_profile, DEFAULT_MODULATION};
use crate::coord::Location;
use crate::packet::ParsedPacket;
use crate::solar::solar_elevation_degrees;
use crate::{SOFTWARE_NAME, VERSION};

/// One amateur telemetry document, serialised with SondeHub's field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dev: bool,
    pub software_name: String,
    pub software_version: String,
    pub uploader_callsign: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    pub comment: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub modulation: String,
    pub time_received: String,
    pub datetime: String,
    pub payload_callsign: String,
    pub lat: f64,
    pub lon: f64,
    /// Metres.
    pub alt: f64,
    /// Solar panel voltage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batt: Option<f64>,
    pub sats: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<f64>,
    /// `"1"` when this packet carried its own fix, `"0"` for a fallback.
    pub has_fix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_fix: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    pub power: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_aloft: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lora_speed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_traveled: Option<String>,
    /// Degrees above the horizon at the balloon.
    pub solar_elevation: f64,
}

impl TelemetryRecord {
    /// Builds the record for `packet` at `location`.
    ///
    /// `has_fix` tells whether `location` came from this packet or from the
    /// balloon's last known fix.
    pub fn from_packet(
        packet: &ParsedPacket,
        location: &Location,
        has_fix: bool,
        now: DateTime<Utc>,
        dev: bool,
    ) -> Self {
        let balloon = &packet.balloon;
        let fields = &packet.fields;
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let altitude = location.altitude.unwrap_or(0.0);
        let profile = fields.frequency_code.and_then(radio_profile);

        Self {
            dev,
            software_name: SOFTWARE_NAME.to_string(),
            software_version: VERSION.to_string(),
            uploader_callsign: packet.receiver.clone(),
            frequency: profile.map(|p| p.frequency_mhz),
            comment: balloon.comment.clone(),
            detail: balloon.detail.clone(),
            device: balloon.device.clone(),
            modulation: profile
                .map_or(DEFAULT_MODULATION, |p| p.modulation)
                .to_string(),
            time_received: timestamp.clone(),
            datetime: timestamp,
            payload_callsign: balloon.payload.clone(),
            lat: location.latitude,
            lon: location.longitude,
            alt: altitude,
            batt: fields.voltage.map(|v| f64::from(v) / 100.0),
            sats: fields.satellites.unwrap_or(0),
            temp: fields.temperature.map(f64::from),
            has_fix: if has_fix { "1" } else { "0" }.to_string(),
            time_to_fix: fields.time_to_fix,
            flight_number: fields.flight_number.map(|n| n.to_string()),
            power: fields.power,
            days_aloft: balloon.days_aloft(now),
            launch_date: balloon.launch_date.clone(),
            frame: fields.frame,
            lora_speed: profile.and_then(|p| p.symbol_rate),
            distance_traveled: fields.odometer_km.map(|km| format!("{} km", km)),
            solar_elevation: solar_elevation_degrees(
                now,
                location.latitude,
                location.longitude,
                altitude,
            ),
        }
    }
}
