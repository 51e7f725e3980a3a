//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::traversal::SubpathLimit;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where the resource tree comes from.
    pub tree: TreeConfig,

    /// Traversal options handed to the router.
    pub traversal: RouterOptions,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Resource tree source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Path to a JSON document holding the tree. Read on every request.
    pub path: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            path: "root.json".to_string(),
        }
    }
}

/// Traversal options.
///
/// Immutable once a router is built from them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Verb (upper case) to maximum subpath length. Verbs without an entry
    /// accept no subpath.
    pub subpath_max_length: HashMap<String, SubpathLimit>,

    /// Strict naming: structural success dispatches to the `""` handler.
    pub strict_traversal: bool,

    /// Fall back to `default_handler` when the resolved name is unregistered.
    pub use_default_handler: bool,

    /// Handler used as the fallback. Must be registered when enabled.
    pub default_handler: String,
}

impl RouterOptions {
    /// Limit for a request verb. Missing entries mean no subpath.
    pub fn subpath_limit(&self, verb: &str) -> SubpathLimit {
        self.subpath_max_length
            .get(verb)
            .or_else(|| self.subpath_max_length.get(&verb.to_ascii_uppercase()))
            .copied()
            .unwrap_or_default()
    }

    /// Builder-style limit setter.
    pub fn with_limit(mut self, verb: &str, limit: SubpathLimit) -> Self {
        self.subpath_max_length.insert(verb.to_ascii_uppercase(), limit);
        self
    }

    /// Options following classic traversal: strict naming, unlimited subpath
    /// for reads, none for writes.
    pub fn strict_defaults() -> Self {
        Self {
            strict_traversal: true,
            ..Self::default()
        }
        .with_limit("GET", SubpathLimit::Unlimited)
        .with_limit("HEAD", SubpathLimit::Unlimited)
        .with_limit("PUT", SubpathLimit::Max(0))
        .with_limit("POST", SubpathLimit::Max(0))
        .with_limit("PATCH", SubpathLimit::Max(0))
        .with_limit("DELETE", SubpathLimit::Max(0))
    }

    /// Verb keys normalized to upper case.
    pub(crate) fn normalized(mut self) -> Self {
        self.subpath_max_length = self
            .subpath_max_length
            .into_iter()
            .map(|(verb, limit)| (verb.to_ascii_uppercase(), limit))
            .collect();
        self
    }
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            subpath_max_length: HashMap::new(),
            strict_traversal: false,
            use_default_handler: false,
            default_handler: String::new(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
