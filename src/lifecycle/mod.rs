//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → trigger() → server stops accepting → drains → exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
