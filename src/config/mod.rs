//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, normalize verbs)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → HttpServer rebuilds the router with the new RouterOptions
//!     → atomic swap; in-flight requests finish on the old router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, ListenerConfig, LogFormat, ObservabilityConfig, RouterOptions, TimeoutConfig,
    TreeConfig,
};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
