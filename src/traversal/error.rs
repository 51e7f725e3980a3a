//! Traversal error taxonomy.
//!
//! Every failure the router can hit ends up here and is handed to the
//! configured error handler, which turns `code()` into a response status.

use axum::http::StatusCode;
use thiserror::Error;

use crate::tree::ProviderError;

/// Why traversal or router setup failed.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// Lookup failed and the remaining subpath exceeds the verb's limit.
    #[error("404 Not Found: {}", display_path(.path))]
    NotFound { path: Vec<String> },

    /// Traversal succeeded but nothing is registered under the handler name.
    #[error("handler not found for route: {}", display_path(.path))]
    UnknownHandler { path: Vec<String> },

    /// The resource tree provider failed.
    #[error("failed to load resource tree: {0}")]
    RootTree(#[source] ProviderError),

    /// A traversal invariant was violated or the router was misconfigured.
    #[error("internal traversal error (bug?): {0}")]
    Internal(String),

    /// `Context::walk_back` was asked for something it cannot produce.
    #[error("cannot walk back: {0}")]
    WalkBack(String),
}

/// Result type for traversal operations.
pub type TraversalResult<T> = Result<T, TraversalError>;

impl TraversalError {
    pub fn not_found(path: &[String]) -> Self {
        TraversalError::NotFound {
            path: path.to_vec(),
        }
    }

    pub fn unknown_handler(path: &[String]) -> Self {
        TraversalError::UnknownHandler {
            path: path.to_vec(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        TraversalError::Internal(msg.into())
    }

    /// HTTP status the error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            TraversalError::NotFound { .. } => StatusCode::NOT_FOUND,
            TraversalError::UnknownHandler { .. } => StatusCode::NOT_IMPLEMENTED,
            TraversalError::RootTree(_)
            | TraversalError::Internal(_)
            | TraversalError::WalkBack(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Numeric result code.
    pub fn code(&self) -> u16 {
        self.status().as_u16()
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TraversalError::NotFound { .. } => "not_found",
            TraversalError::UnknownHandler { .. } => "unknown_handler",
            TraversalError::RootTree(_) => "tree_error",
            TraversalError::Internal(_) => "internal",
            TraversalError::WalkBack(_) => "walk_back",
        }
    }
}

fn display_path(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_codes() {
        assert_eq!(TraversalError::not_found(&path(&["a"])).code(), 404);
        assert_eq!(TraversalError::internal("x").code(), 500);
        assert_eq!(TraversalError::WalkBack("x".into()).code(), 500);

        let source: ProviderError = "db down".into();
        assert_eq!(TraversalError::RootTree(source).code(), 500);
    }

    // Unknown handlers answer 501 Not Implemented, not a 4xx client error.
    #[test]
    fn test_unknown_handler_is_not_implemented() {
        let err = TraversalError::unknown_handler(&path(&["a", "b"]));
        assert_eq!(err.status(), StatusCode::NOT_IMPLEMENTED);
        assert!(!err.status().is_client_error());
    }

    #[test]
    fn test_messages_include_path_and_source() {
        let err = TraversalError::not_found(&path(&["foo", "bar"]));
        assert_eq!(err.to_string(), "404 Not Found: /foo/bar");

        let err = TraversalError::RootTree("db down".into());
        assert_eq!(err.to_string(), "failed to load resource tree: db down");
        assert!(std::error::Error::source(&err).is_some());
    }
}
