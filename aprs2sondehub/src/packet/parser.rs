//! Discard rules and packet assembly.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{fields, DiscardReason, PacketFields, ParsedPacket};
use crate::balloon::BalloonRegistry;

/// Any of these means an iGate appended reception diagnostics.
const NOISE_MARKERS: [&str; 6] = ["SNR", "RSSI", "snr", "rssi", "DP_RSSI", " DS "];

/// Cut points for the diagnostic suffix, tried in order.
const CUT_MARKERS: [&str; 4] = ["rssi:", "DP_RSSI:", " DS ", "  SNR="];

/// Parses raw feed lines for the configured balloons.
#[derive(Debug)]
pub struct PacketParser {
    balloons: Arc<BalloonRegistry>,
    ignored: HashSet<String>,
}

impl PacketParser {
    /// Creates a parser; `ignored` lists source callsigns to drop.
    pub fn new(balloons: Arc<BalloonRegistry>, ignored: impl IntoIterator<Item = String>) -> Self {
        Self {
            balloons,
            ignored: ignored.into_iter().collect(),
        }
    }

    /// The balloon registry packets are matched against.
    pub fn balloons(&self) -> &Arc<BalloonRegistry> {
        &self.balloons
    }

    /// Applies the discard rules in order, then decodes the packet.
    pub fn parse(&self, line: &str) -> Result<ParsedPacket, DiscardReason> {
        if line.contains(['\n', '\r']) {
            return Err(DiscardReason::Merged);
        }
        if line.contains("TCPIP") {
            return Err(DiscardReason::ViaInternet);
        }

        let source = fields::source(line);

        if !line.contains("NOHUB") {
            if self.balloons.get(source).is_some() {
                warn!(source, line, "Balloon packet without NOHUB, ignoring");
            }
            return Err(DiscardReason::NotNoHub);
        }
        if self.ignored.contains(source) {
            return Err(DiscardReason::IgnoredStation);
        }

        let line = strip_diagnostics(line)?;

        if !line.contains("/P") {
            return Err(DiscardReason::NoAnchor);
        }

        let balloon = match self.balloons.get(source) {
            Some(balloon) if balloon.active => Arc::clone(balloon),
            Some(_) => return Err(DiscardReason::InactiveBalloon),
            None => return Err(DiscardReason::UnknownBalloon),
        };

        let receiver = fields::receiver(line).ok_or(DiscardReason::NoReceiver)?;
        let comment = fields::comment(line);
        let fields = PacketFields::extract(comment, line);
        let position = fields::position(line).map(|fix| fix.with_altitude(fields.altitude_m));

        Ok(ParsedPacket {
            source: source.to_string(),
            receiver: receiver.to_string(),
            balloon,
            comment: comment.to_string(),
            fields,
            position,
        })
    }
}

/// Truncates an iGate diagnostic suffix.
///
/// Lines without noise markers pass through unchanged.
fn strip_diagnostics(line: &str) -> Result<&str, DiscardReason> {
    if !NOISE_MARKERS.iter().any(|marker| line.contains(marker)) {
        return Ok(line);
    }

    let cut = CUT_MARKERS
        .iter()
        .find_map(|marker| line.find(marker))
        .ok_or(DiscardReason::Unparseable)?;

    let cleaned = line[..cut].trim_end();
    debug!(original = line, cleaned, "Stripped diagnostic suffix");
    Ok(cleaned)
}
