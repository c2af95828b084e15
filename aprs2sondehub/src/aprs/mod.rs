//! APRS-IS plumbing: login passcode, the line-oriented stream client and
//! the outbound frame encoders.
//!
//! # Architecture
//!
//! ```text
//! AprsIsClient::connect ──► TCP 14580 ──► login line
//!        │
//!        ├── read loop ──► `#` comments dropped
//!        │            └──► LineHandler::handle_line(line, &AprsIsSender)
//!        │
//!        └── AprsIsSender::send(frame) ──► same session's write half
//! ```

mod client;
mod error;
mod passcode;
pub mod telemetry;

pub use client::{
    AprsIsClient, AprsIsConfig, AprsIsSender, LineHandler, SessionSummary, DEFAULT_APRS_IS_PORT,
};
pub use error::StreamError;
pub use passcode::{login_line, passcode};
