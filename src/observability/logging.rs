//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick the log level from `RUST_LOG` or the config
//! - Pick pretty or JSON output from the config

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(config: &ObservabilityConfig) -> String {
    format!(
        "travel_router={level},tower_http={level}",
        level = config.log_level.to_ascii_lowercase()
    )
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    }
}
