//! Balloon packet parsing.
//!
//! [`PacketParser`] turns one raw APRS-IS line into a [`ParsedPacket`] or a
//! [`DiscardReason`]. Discards are ordinary outcomes, not errors: most of
//! the feed is expected to be dropped.

pub mod fields;
mod parser;

use std::fmt;
use std::sync::Arc;

use crate::balloon::BalloonConfig;
use crate::coord::Location;

pub use parser::PacketParser;

/// Why a line did not produce telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    /// Line contains an embedded CR or LF (two packets merged).
    Merged,
    /// Packet was gated over TCP/IP rather than heard on RF.
    ViaInternet,
    /// Sender did not opt in with `NOHUB`.
    NotNoHub,
    /// Source station is on the ignore list.
    IgnoredStation,
    /// Diagnostic suffix present but no known cut point.
    Unparseable,
    /// No `/P` anchor.
    NoAnchor,
    /// No balloon is configured for the source callsign.
    UnknownBalloon,
    /// Balloon is configured but not active.
    InactiveBalloon,
    /// Receiving station could not be found in the path.
    NoReceiver,
    /// Same receiver was accepted within the dedup window.
    DuplicateReceiver,
    /// No fix in the packet and none seen before for this balloon.
    NoLocationYet,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DiscardReason::Merged => "merged packet",
            DiscardReason::ViaInternet => "gated via TCPIP",
            DiscardReason::NotNoHub => "missing NOHUB marker",
            DiscardReason::IgnoredStation => "ignored station",
            DiscardReason::Unparseable => "unparseable diagnostic suffix",
            DiscardReason::NoAnchor => "no /P anchor",
            DiscardReason::UnknownBalloon => "unknown balloon",
            DiscardReason::InactiveBalloon => "inactive balloon",
            DiscardReason::NoReceiver => "no receiver in path",
            DiscardReason::DuplicateReceiver => "duplicate receiver",
            DiscardReason::NoLocationYet => "no location yet",
        };
        f.write_str(text)
    }
}

/// Numeric fields decoded from the comment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PacketFields {
    pub frame: Option<u32>,
    pub satellites: Option<u32>,
    /// Transmit power, defaults to 20 when absent.
    pub power: u32,
    pub flight_number: Option<u32>,
    /// Seconds to GPS fix.
    pub time_to_fix: Option<i32>,
    /// Degrees Celsius.
    pub temperature: Option<i32>,
    /// Hundredths of a volt.
    pub voltage: Option<u32>,
    pub frequency_code: Option<u32>,
    pub odometer_km: Option<u64>,
    /// Metres, from the `A=` extension.
    pub altitude_m: Option<f64>,
}

impl PacketFields {
    /// Extracts every field from a comment and the line it came from.
    pub fn extract(comment: &str, line: &str) -> Self {
        Self {
            frame: fields::frame(comment),
            satellites: fields::satellites(comment),
            power: fields::power(comment),
            flight_number: fields::flight_number(comment),
            time_to_fix: fields::time_to_fix(comment),
            temperature: fields::temperature(comment),
            voltage: fields::voltage(comment),
            frequency_code: fields::frequency_code(comment),
            odometer_km: fields::odometer_km(comment),
            altitude_m: fields::altitude_m(line),
        }
    }
}

/// A balloon packet that passed every discard rule.
#[derive(Debug, Clone)]
pub struct ParsedPacket {
    /// Source callsign.
    pub source: String,
    /// Station that heard the packet.
    pub receiver: String,
    /// The configured balloon this packet belongs to.
    pub balloon: Arc<BalloonConfig>,
    /// Comment text after the last `/`.
    pub comment: String,
    pub fields: PacketFields,
    /// Decoded fix with altitude, `None` when the tracker had no fix.
    pub position: Option<Location>,
}
