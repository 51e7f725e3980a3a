//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware)
//!     → request.rs (add/propagate request ID)
//!     → routing::Router::serve (traversal, dispatch)
//!     → response.rs (error rendering when traversal fails)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
pub use response::{default_error_handler, ErrorBody};
pub use server::{AppState, HttpServer};
