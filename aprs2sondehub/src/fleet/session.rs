//! One server's reconnect loop and the line handler it drives.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::FleetConfig;
use crate::aprs::{AprsIsClient, AprsIsSender, LineHandler};
use crate::pipeline::{Dispatch, PipelineOutcome, TelemetryPipeline};
use crate::sondehub::TelemetrySink;

/// How a session ended, judged by how long it lasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// Closed almost immediately: the server refused us.
    Rejected,
    /// Ran for a while, then dropped: worth reconnecting.
    Dropped,
}

/// Classifies a finished session by its lifetime.
pub(crate) fn classify(lived: Duration, reject_threshold: Duration) -> SessionEnd {
    if lived < reject_threshold {
        SessionEnd::Rejected
    } else {
        SessionEnd::Dropped
    }
}

/// Why a server task stopped for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ServerExit {
    Rejected,
    Shutdown,
}

/// Feeds lines into the shared pipeline and performs the resulting
/// upload and frame sends.
pub struct SessionHandler<S> {
    pipeline: Arc<TelemetryPipeline>,
    sink: Arc<S>,
}

impl<S> SessionHandler<S> {
    pub fn new(pipeline: Arc<TelemetryPipeline>, sink: Arc<S>) -> Self {
        Self { pipeline, sink }
    }
}

impl<S> Clone for SessionHandler<S> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: TelemetrySink + 'static> LineHandler for SessionHandler<S> {
    async fn handle_line(&self, line: String, sender: &AprsIsSender) {
        let PipelineOutcome::Accepted(dispatch) = self.pipeline.handle_line(&line, Utc::now())
        else {
            return;
        };
        let Dispatch { record, frames } = *dispatch;

        let sink = Arc::clone(&self.sink);
        let payload = record.payload_callsign.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.upload(vec![record]).await {
                warn!(payload = %payload, error = %e, "Telemetry upload failed");
            }
        });

        for frame in frames {
            if !sender.send(&frame.text).await {
                debug!(host = sender.host(), kind = ?frame.kind, "Outbound frame dropped");
            }
        }
    }
}

/// Keeps one server connected until it rejects us or shutdown is requested.
pub(crate) async fn run_server<S: TelemetrySink + 'static>(
    client: AprsIsClient,
    login: Arc<str>,
    filter: Arc<[String]>,
    handler: SessionHandler<S>,
    config: FleetConfig,
    shutdown: CancellationToken,
) -> ServerExit {
    let host = client.host().to_string();
    let mut sessions: u64 = 0;

    loop {
        sessions += 1;
        let started = Instant::now();

        let result = tokio::select! {
            result = client.connect(&login, &filter, &handler) => Some(result),
            _ = shutdown.cancelled() => None,
        };
        let Some(result) = result else {
            client.disconnect().await;
            info!(host = %host, "APRS-IS session stopped");
            return ServerExit::Shutdown;
        };

        let lived = started.elapsed();
        if let Err(e) = &result {
            debug!(host = %host, error = %e, "Session ended with error");
        }

        match classify(lived, config.reject_threshold) {
            SessionEnd::Rejected => {
                warn!(
                    host = %host,
                    lived_ms = lived.as_millis() as u64,
                    sessions,
                    "APRS-IS server closed the session too quickly, giving up on it"
                );
                return ServerExit::Rejected;
            }
            SessionEnd::Dropped => {
                info!(
                    host = %host,
                    lived_secs = lived.as_secs(),
                    delay_secs = config.reconnect_delay.as_secs(),
                    "APRS-IS session dropped, reconnecting"
                );
                tokio::select! {
                    _ = tokio::time::sleep(config.reconnect_delay) => {}
                    _ = shutdown.cancelled() => return ServerExit::Shutdown,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::mpsc;

    use crate::aprs::AprsIsConfig;
    use crate::balloon::{BalloonConfig, BalloonRegistry};
    use crate::packet::PacketParser;
    use crate::pipeline::{PipelineConfig, TelemetryRecord};
    use crate::sondehub::SinkError;

    const LINE: &str = "SQ2IPS-11>APLIGA,NOHUB,qAR,SR9NDJ-10:/123456h5030.00N/01915.00EO180/012/A=032810/P12S9T-20V331F2N3O18FT7ODO=12kkm";

    struct ChannelSink {
        tx: mpsc::UnboundedSender<Vec<TelemetryRecord>>,
    }

    impl TelemetrySink for ChannelSink {
        async fn upload(&self, records: Vec<TelemetryRecord>) -> Result<(), SinkError> {
            let _ = self.tx.send(records);
            Ok(())
        }
    }

    fn pipeline() -> Arc<TelemetryPipeline> {
        let balloon = BalloonConfig {
            payload: "SQ2IPS-PICO".to_string(),
            ham_callsign: "SQ2IPS-11".to_string(),
            comment: "pico".to_string(),
            detail: String::new(),
            device: None,
            launch_date: None,
            active: true,
        };
        let registry = Arc::new(BalloonRegistry::new(vec![balloon]));
        Arc::new(TelemetryPipeline::new(
            PacketParser::new(registry, Vec::new()),
            PipelineConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_dropped_frames_still_count_as_sent() {
        let pipeline = pipeline();
        let (tx, mut uploads) = mpsc::unbounded_channel();
        let handler = SessionHandler::new(Arc::clone(&pipeline), Arc::new(ChannelSink { tx }));

        // Never connected, so every send fails.
        let client = AprsIsClient::new(AprsIsConfig::new("127.0.0.1"));
        let sender = client.sender();
        assert!(!sender.send("N0CALL>APZHUB:>test").await);

        handler.handle_line(LINE.to_string(), &sender).await;

        let uploaded = tokio::time::timeout(Duration::from_secs(5), uploads.recv())
            .await
            .expect("no upload")
            .unwrap();
        assert_eq!(uploaded[0].payload_callsign, "SQ2IPS-PICO");

        // A second receiver inside every throttle window gets a record but no
        // frames: the failed sends above were not retried.
        let other = LINE.replace("SR9NDJ-10", "SP2ROC-10");
        let again = pipeline.handle_line(&other, Utc::now());
        let dispatch = again.dispatch().expect("second receiver accepted");
        assert!(dispatch.frames.is_empty(), "frames {:?}", dispatch.frames);
    }

    #[test]
    fn test_classify() {
        let threshold = Duration::from_secs(10);
        assert_eq!(classify(Duration::from_secs(0), threshold), SessionEnd::Rejected);
        assert_eq!(
            classify(Duration::from_millis(9_999), threshold),
            SessionEnd::Rejected
        );
        assert_eq!(classify(Duration::from_secs(10), threshold), SessionEnd::Dropped);
        assert_eq!(classify(Duration::from_secs(3600), threshold), SessionEnd::Dropped);
    }
}
