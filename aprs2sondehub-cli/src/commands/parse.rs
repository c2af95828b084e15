//! Parse command - run one raw APRS-IS line through the parser and
//! pipeline without connecting or uploading anything.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use aprs2sondehub::balloon::BalloonRegistry;
use aprs2sondehub::config::ConfigFile;
use aprs2sondehub::packet::PacketParser;
use aprs2sondehub::pipeline::{PipelineOutcome, TelemetryPipeline};

use crate::error::CliError;
use crate::runner::resolve_config_path;

/// Print what the bridge would do with `line`.
pub fn run(config_path: Option<&Path>, line: &str) -> Result<(), CliError> {
    let config = ConfigFile::load_from(&resolve_config_path(config_path))?;
    let registry = Arc::new(BalloonRegistry::new(config.load_balloons()?));
    let parser = PacketParser::new(registry, config.aprs.ignored_stations.clone());
    let pipeline = TelemetryPipeline::new(parser, config.pipeline_config());

    let packet = match pipeline.parser().parse(line) {
        Ok(packet) => packet,
        Err(reason) => {
            println!("Discarded: {}", reason);
            return Ok(());
        }
    };

    println!("Source:    {}", packet.source);
    println!("Receiver:  {}", packet.receiver);
    println!("Payload:   {}", packet.balloon.payload);
    match &packet.position {
        Some(location) => println!(
            "Position:  {:.5}, {:.5} at {:.0} m",
            location.latitude,
            location.longitude,
            location.altitude.unwrap_or(0.0)
        ),
        None => println!("Position:  (no fix)"),
    }
    println!("Fields:    {:?}", packet.fields);
    println!();

    match pipeline.process(packet, Utc::now()) {
        PipelineOutcome::Discarded(reason) => println!("Discarded: {}", reason),
        PipelineOutcome::Accepted(dispatch) => {
            let json = serde_json::to_string_pretty(&dispatch.record).map_err(CliError::Encode)?;
            println!("SondeHub record:");
            println!("{}", json);

            if !dispatch.frames.is_empty() {
                println!();
                println!("APRS-IS frames:");
                for frame in &dispatch.frames {
                    println!("  {}", frame.text);
                }
            }
        }
    }

    Ok(())
}
