//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, server and config reload produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request counters and latency histogram)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through HTTP spans
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
