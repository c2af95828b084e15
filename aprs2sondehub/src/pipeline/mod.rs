//! Per-balloon state and the packet-to-telemetry pipeline.
//!
//! A single [`TelemetryPipeline`] is shared by every APRS-IS session. It
//! owns all mutable state, each piece behind its own lock:
//!
//! | State               | Key         | Lock     |
//! |---------------------|-------------|----------|
//! | last known fix      | hamCallsign | `RwLock` |
//! | receiver dedup      | receiver    | `Mutex`  |
//! | status beacon gate  | payload     | `Mutex`  |
//! | telemetry gate, sequence, metadata sent | hamCallsign | `Mutex` |
//!
//! The pipeline does no I/O. [`TelemetryPipeline::process`] returns a
//! [`Dispatch`] describing the upload and the frames to send; the caller
//! performs them. Time is passed in so windows can be tested.

mod frequency;
mod record;
mod throttle;

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::aprs::telemetry::{initial_frames, status_frame, telemetry_frame};
use crate::coord::Location;
use crate::packet::{DiscardReason, PacketParser, ParsedPacket};

pub use frequency::{radio_profile, RadioProfile, DEFAULT_MODULATION};
pub use record::TelemetryRecord;

use throttle::{TelemetryState, Throttle};

/// Default receiver dedup window.
pub const DEFAULT_RECEIVER_WINDOW: Duration = Duration::from_secs(30);

/// Default interval between status beacons per payload.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Default interval between telemetry frames per balloon.
pub const DEFAULT_TELEMETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Default tracker base URL used in status beacons.
pub const DEFAULT_TRACKER_URL: &str = "https://amateur.sondehub.org/";

/// Pipeline tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Packets from the same receiver inside this window are dropped.
    pub receiver_window: Duration,
    /// Minimum time between status beacons for one payload.
    pub status_interval: Duration,
    /// Minimum time between telemetry frames for one balloon.
    pub telemetry_interval: Duration,
    /// Status beacons point at `tracker_url` + payload.
    pub tracker_url: String,
    /// Mark uploaded records as development data.
    pub dev: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            receiver_window: DEFAULT_RECEIVER_WINDOW,
            status_interval: DEFAULT_STATUS_INTERVAL,
            telemetry_interval: DEFAULT_TELEMETRY_INTERVAL,
            tracker_url: DEFAULT_TRACKER_URL.to_string(),
            dev: false,
        }
    }
}

/// Kind of an outbound APRS frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `>` status beacon with the tracker link.
    Status,
    /// PARM/UNIT/EQNS/BITS metadata.
    Metadata,
    /// `T#` telemetry with its sequence number.
    Telemetry(u8),
}

/// An APRS frame to write back to the originating session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub kind: FrameKind,
    pub text: String,
}

/// Side effects requested for one accepted packet.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// Record to upload.
    pub record: TelemetryRecord,
    /// Frames in send order: status, metadata, telemetry.
    pub frames: Vec<OutboundFrame>,
}

/// Result of feeding one line or packet to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Accepted(Box<Dispatch>),
    Discarded(DiscardReason),
}

impl PipelineOutcome {
    /// The dispatch, if the packet was accepted.
    pub fn dispatch(&self) -> Option<&Dispatch> {
        match self {
            PipelineOutcome::Accepted(dispatch) => Some(dispatch),
            PipelineOutcome::Discarded(_) => None,
        }
    }

    /// The discard reason, if the packet was dropped.
    pub fn discard_reason(&self) -> Option<DiscardReason> {
        match self {
            PipelineOutcome::Accepted(_) => None,
            PipelineOutcome::Discarded(reason) => Some(*reason),
        }
    }
}

/// Shared packet-to-telemetry pipeline.
pub struct TelemetryPipeline {
    parser: PacketParser,
    config: PipelineConfig,
    locations: RwLock<HashMap<String, Location>>,
    receivers: Mutex<Throttle>,
    status: Mutex<Throttle>,
    telemetry: Mutex<TelemetryState>,
}

impl TelemetryPipeline {
    pub fn new(parser: PacketParser, config: PipelineConfig) -> Self {
        Self {
            receivers: Mutex::new(Throttle::new(config.receiver_window)),
            status: Mutex::new(Throttle::new(config.status_interval)),
            telemetry: Mutex::new(TelemetryState::new(config.telemetry_interval)),
            locations: RwLock::new(HashMap::new()),
            parser,
            config,
        }
    }

    /// The parser used by [`handle_line`](Self::handle_line).
    pub fn parser(&self) -> &PacketParser {
        &self.parser
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Last known fix for a balloon callsign.
    pub fn last_location(&self, callsign: &str) -> Option<Location> {
        self.locations
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(callsign)
            .copied()
    }

    /// Parses and processes one raw feed line.
    pub fn handle_line(&self, line: &str, now: DateTime<Utc>) -> PipelineOutcome {
        match self.parser.parse(line) {
            Ok(packet) => self.process(packet, now),
            Err(reason) => {
                debug!(reason = %reason, line, "Packet discarded");
                PipelineOutcome::Discarded(reason)
            }
        }
    }

    /// Runs a parsed packet through dedup, position resolution and the
    /// outbound throttles.
    pub fn process(&self, packet: ParsedPacket, now: DateTime<Utc>) -> PipelineOutcome {
        let callsign = packet.balloon.ham_callsign.as_str();
        let payload = packet.balloon.payload.as_str();

        let fresh_receiver = self
            .receivers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .try_pass(&packet.receiver, now);
        if !fresh_receiver {
            debug!(receiver = %packet.receiver, payload, "Duplicate receiver, discarding");
            return PipelineOutcome::Discarded(DiscardReason::DuplicateReceiver);
        }

        let (location, has_fix) = match packet.position {
            Some(fix) => {
                self.locations
                    .write()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(callsign.to_string(), fix);
                (fix, true)
            }
            None => match self.last_location(callsign) {
                Some(last) => (last, false),
                None => {
                    info!(payload, "Packet without fix and no known location yet, skipping");
                    return PipelineOutcome::Discarded(DiscardReason::NoLocationYet);
                }
            },
        };

        let record =
            TelemetryRecord::from_packet(&packet, &location, has_fix, now, self.config.dev);
        let mut frames = Vec::new();

        let status_due = self
            .status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .try_pass(payload, now);
        if status_due {
            let url = format!("{}{}", self.config.tracker_url, payload);
            frames.push(OutboundFrame {
                kind: FrameKind::Status,
                text: status_frame(callsign, &url),
            });
        }

        {
            let mut telemetry = self.telemetry.lock().unwrap_or_else(|e| e.into_inner());

            if telemetry.mark_initialized(callsign) {
                frames.extend(initial_frames(callsign).into_iter().map(|text| OutboundFrame {
                    kind: FrameKind::Metadata,
                    text,
                }));
            }

            if telemetry.throttle.try_pass(callsign, now) {
                let sequence = telemetry.next_sequence(callsign);
                frames.push(OutboundFrame {
                    kind: FrameKind::Telemetry(sequence),
                    text: telemetry_frame(
                        callsign,
                        sequence,
                        record.temp,
                        record.batt,
                        record.solar_elevation,
                    ),
                });
            }
        }

        info!(
            payload,
            receiver = %packet.receiver,
            has_fix,
            lat = location.latitude,
            lon = location.longitude,
            frames = frames.len(),
            "Accepted balloon packet"
        );

        PipelineOutcome::Accepted(Box::new(Dispatch { record, frames }))
    }
}
