use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::config;

/// Initialize structured logging for a run.
///
/// Diagnostics go to stderr so the workflow transcript on stdout stays
/// clean; `RUST_LOG` overrides the configured level, and the configured
/// format switches between human-readable and JSON output.
pub fn init_telemetry() -> Result<()> {
    let (level, format) = match config() {
        Ok(config) => (
            config.observability.log_level.clone(),
            config.observability.log_format.clone(),
        ),
        Err(_) => ("warn".to_string(), "plain".to_string()),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    }

    tracing::debug!("Mintline telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the steps of one run
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}
