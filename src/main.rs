use adsb_tracker::{AdsbConfig, AppState, GeodesicCalculator, OpenSkyClient, TrackingService, telemetry, web};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// `--config <path>` on the command line, if given
fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AdsbConfig::load_from_path(config_path_from_args())?;
    telemetry::init(&config.logging)?;

    let provider = OpenSkyClient::new(&config.provider).context("Failed to create OpenSky client")?;
    tracing::info!(
        base_url = provider.base_url(),
        authenticated = provider.is_authenticated(),
        "Using OpenSky Network provider"
    );

    let tracking = TrackingService::new(Arc::new(provider), GeodesicCalculator::default());
    web::run(&config, AppState { tracking }).await?;
    Ok(())
}
