//! Logging setup shared by the server and agent binaries
//!
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;
use crate::{AdsbError, Result};

/// Install the global tracing subscriber.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| AdsbError::config(format!("Invalid log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match logging.format.as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        _ => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|e| AdsbError::config(format!("Logging already initialized: {e}")))
}
