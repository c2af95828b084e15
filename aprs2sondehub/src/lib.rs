//! aprs2sondehub - balloon telemetry bridge from APRS-IS to SondeHub
//!
//! Listens to one or more APRS-IS servers for packets from configured
//! high-altitude balloons, decodes the telemetry carried in their comments,
//! uploads it to the SondeHub amateur tracker and beacons status and
//! telemetry frames back into APRS-IS.
//!
//! # Data flow
//!
//! ```text
//! FleetSupervisor ──► N × AprsIsClient ──► raw line
//!                                            │
//!                                  PacketParser (packet)
//!                                            │
//!                               TelemetryPipeline (pipeline)
//!                                 │                    │
//!                 SondehubClient::upload     frames ──► same AprsIsClient
//! ```

pub mod aprs;
pub mod balloon;
pub mod config;
pub mod coord;
pub mod fleet;
pub mod logging;
pub mod packet;
pub mod pipeline;
pub mod solar;
pub mod sondehub;

/// Version of the library and CLI, reported to APRS-IS and SondeHub.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Software name reported to APRS-IS and SondeHub.
pub const SOFTWARE_NAME: &str = "aprs2sondehub";
