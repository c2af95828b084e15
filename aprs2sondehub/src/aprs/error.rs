//! Error types for APRS-IS sessions.

use thiserror::Error;

/// Errors that end an APRS-IS session.
///
/// Outbound frame failures are not represented here; `AprsIsSender::send`
/// reports them as `false`.
#[derive(Debug, Error)]
pub enum StreamError {
    /// TCP connection could not be established.
    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// The login line could not be written.
    #[error("Failed to send login to {host}: {source}")]
    Login {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the feed failed mid-session.
    #[error("Read from {host} failed: {source}")]
    Read {
        host: String,
        #[source]
        source: std::io::Error,
    },
}
