//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject subpath limits keyed by something that is not an HTTP verb
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Default handler existence is checked by the router builder, which owns
//!   the handler map

use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("tree.path must not be empty")]
    EmptyTreePath,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("traversal.subpath_max_length key {0:?} is not an HTTP verb")]
    Verb(String),
}

/// Check a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.tree.path.trim().is_empty() {
        errors.push(ValidationError::EmptyTreePath);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut verbs: Vec<&String> = config.traversal.subpath_max_length.keys().collect();
    verbs.sort();
    for verb in verbs {
        if verb.is_empty() || Method::from_bytes(verb.as_bytes()).is_err() {
            errors.push(ValidationError::Verb(verb.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
