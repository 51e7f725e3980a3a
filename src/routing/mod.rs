//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (tokenize, fetch tree, traverse with verb limit)
//!     → handler lookup: Found | Fallback (default handler) | NoMatch
//!     → handler.rs (invoke with Context) or error handler
//!
//! Router Construction (at startup / on config reload):
//!     HandlerMap + RouterOptions + TreeProvider
//!     → RouterBuilder::build (validate default handler)
//!     → immutable Router
//! ```
//!
//! # Design Decisions
//! - Routers are immutable once built; reloads build a new one
//! - Exactly one of handler, default handler or error handler runs per request
//! - The tree is fetched per request; nothing is cached between requests

pub mod context;
pub mod handler;
pub mod router;

pub use context::Context;
pub use handler::{ErrorHandler, Handler, HandlerMap};
pub use router::{Outcome, Router, RouterBuilder};
