//! Run command - bridge the configured balloons from APRS-IS to SondeHub.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use aprs2sondehub::balloon::BalloonRegistry;
use aprs2sondehub::fleet::FleetSupervisor;
use aprs2sondehub::packet::PacketParser;
use aprs2sondehub::pipeline::TelemetryPipeline;
use aprs2sondehub::sondehub::SondehubClient;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run until Ctrl-C, or until most APRS-IS servers have rejected us.
pub fn run(config_path: Option<&Path>, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, debug)?;
    runner.log_startup("run");
    let config = runner.config();

    let servers = config.load_servers()?;
    let registry = Arc::new(BalloonRegistry::new(config.load_balloons()?));
    let filter = registry.active_callsigns();

    info!(
        servers = servers.len(),
        balloons = registry.len(),
        active = filter.len(),
        callsign = %config.station.callsign,
        "Configuration loaded"
    );
    if filter.is_empty() {
        warn!("No active balloons configured, nothing will be forwarded");
    }
    if config.sondehub.dev {
        warn!("Uploads are marked as development data");
    }

    let parser = PacketParser::new(Arc::clone(&registry), config.aprs.ignored_stations.clone());
    let pipeline = Arc::new(TelemetryPipeline::new(parser, config.pipeline_config()));
    let sink = Arc::new(SondehubClient::new(&config.sondehub.api_url)?);

    let supervisor = FleetSupervisor::new(
        servers,
        config.station.callsign.clone(),
        filter,
        pipeline,
        sink,
        config.fleet_config(),
    );

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    let shutdown = CancellationToken::new();

    let result = runtime.block_on(async {
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown requested"),
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
            }
            signal_token.cancel();
        });

        supervisor.run(shutdown).await
    });

    // Sessions are gone; pending uploads are abandoned with the runtime.
    runtime.shutdown_background();

    result?;
    info!("Stopped");
    Ok(())
}
