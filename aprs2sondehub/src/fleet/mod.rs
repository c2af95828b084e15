//! Runs one APRS-IS session per configured server.
//!
//! Every server gets its own task and reconnect loop; all of them feed the
//! same [`TelemetryPipeline`]. A server that closes a session within the
//! reject threshold is given up on. Once fewer than half of the configured
//! servers remain, [`FleetSupervisor::run`] fails with
//! [`FleetError::MajorityLost`] and the process is expected to exit.
//!
//! ```text
//!                 ┌── run_server(euro.aprs2.net) ──┐
//! FleetSupervisor ├── run_server(noam.aprs2.net) ──┼──► TelemetryPipeline
//!        ▲        └── run_server(...)            ──┘
//!        └──────── exit events (mpsc) ◄── rejected servers
//! ```

mod session;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::aprs::{AprsIsClient, AprsIsConfig, DEFAULT_APRS_IS_PORT};
use crate::pipeline::TelemetryPipeline;
use crate::sondehub::TelemetrySink;

pub use session::SessionHandler;

use session::{run_server, ServerExit};

/// Default lifetime below which a closed session counts as a rejection.
pub const DEFAULT_REJECT_THRESHOLD: Duration = Duration::from_secs(10);

/// Default pause before reconnecting a dropped session.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(15);

/// Fleet-level failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FleetError {
    #[error("No APRS-IS servers configured")]
    NoServers,

    #[error("Only {alive} of {configured} APRS-IS servers still connected")]
    MajorityLost { alive: usize, configured: usize },
}

/// Session policy shared by every server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetConfig {
    /// APRS-IS port used for every server.
    pub port: u16,
    /// Sessions shorter than this count as rejected.
    pub reject_threshold: Duration,
    /// Wait between a dropped session and the next attempt.
    pub reconnect_delay: Duration,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_APRS_IS_PORT,
            reject_threshold: DEFAULT_REJECT_THRESHOLD,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Supervises the per-server session tasks.
pub struct FleetSupervisor<S> {
    servers: Vec<String>,
    login: String,
    filter: Vec<String>,
    pipeline: Arc<TelemetryPipeline>,
    sink: Arc<S>,
    config: FleetConfig,
}

impl<S: TelemetrySink + 'static> FleetSupervisor<S> {
    /// Creates a supervisor.
    ///
    /// `login` is the station callsign, `filter` the balloon callsigns for
    /// the budlist filter.
    pub fn new(
        servers: Vec<String>,
        login: impl Into<String>,
        filter: Vec<String>,
        pipeline: Arc<TelemetryPipeline>,
        sink: Arc<S>,
        config: FleetConfig,
    ) -> Self {
        Self {
            servers,
            login: login.into(),
            filter,
            pipeline,
            sink,
            config,
        }
    }

    /// Runs every session until `shutdown` fires or the majority is lost.
    ///
    /// Returns `Ok` only after shutdown, once all sessions have stopped.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), FleetError> {
        let configured = self.servers.len();
        if configured == 0 {
            return Err(FleetError::NoServers);
        }

        info!(
            servers = configured,
            login = %self.login,
            balloons = self.filter.len(),
            "Starting APRS-IS fleet"
        );

        let sessions_token = shutdown.child_token();
        let login: Arc<str> = Arc::from(self.login.as_str());
        let filter: Arc<[String]> = Arc::from(self.filter);
        let handler = SessionHandler::new(self.pipeline, self.sink);
        let (exit_tx, mut exit_rx) = mpsc::channel::<String>(configured);
        let mut tasks = JoinSet::new();

        for host in self.servers {
            let config = AprsIsConfig::new(host.clone()).with_port(self.config.port);
            let client = AprsIsClient::new(config);
            let exit_tx = exit_tx.clone();
            let session = run_server(
                client,
                Arc::clone(&login),
                Arc::clone(&filter),
                handler.clone(),
                self.config,
                sessions_token.clone(),
            );

            tasks.spawn(async move {
                if session.await == ServerExit::Rejected {
                    let _ = exit_tx.send(host).await;
                }
            });
        }
        drop(exit_tx);

        let mut alive = configured;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                exited = exit_rx.recv() => {
                    let Some(host) = exited else { break };
                    alive -= 1;
                    warn!(host = %host, alive, configured, "APRS-IS server lost");

                    if alive * 2 < configured {
                        error!(alive, configured, "Majority of APRS-IS servers lost");
                        sessions_token.cancel();
                        tasks.abort_all();
                        return Err(FleetError::MajorityLost { alive, configured });
                    }
                }
            }
        }

        sessions_token.cancel();
        while tasks.join_next().await.is_some() {}
        info!("APRS-IS fleet stopped");
        Ok(())
    }
}
