//! Traversal resolution.
//!
//! # Data Flow
//! ```text
//! request path ("/foo/bar/")
//!     → path.rs (trim one separator each side, split)
//!     → tokens ["foo", "bar"]
//!     → engine.rs (walk ResourceTree segment by segment)
//!     → Traversal { handler, current, subpath } or TraversalError
//! ```
//!
//! # Design Decisions
//! - The engine is a pure function: no I/O, no shared state, no panics
//! - Structural success routes to a generic handler in strict mode
//! - Structural failure at token k elects token k as the handler name;
//!   tokens after it are the subpath, bounded per verb by `SubpathLimit`

pub mod engine;
pub mod error;
pub mod limit;
pub mod path;

pub use engine::{traverse, HandlerName, Traversal};
pub use error::{TraversalError, TraversalResult};
pub use limit::SubpathLimit;
pub use path::{tokenize, tokenize_uri_path, InvalidSegment};
