//! Traversal routing for HTTP services.
//!
//! Requests are resolved by walking a resource tree one path segment at a
//! time. The walk produces a handler name, the node it stopped at and the
//! unconsumed subpath; the router then dispatches to the named handler.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod traversal;
pub mod tree;

pub use config::{AppConfig, RouterOptions};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Context, HandlerMap, Router};
pub use traversal::{SubpathLimit, TraversalError};
pub use tree::{ResourceNode, ResourceTree, TreeProvider};
