//! Error responses.
//!
//! # Responsibilities
//! - Render a `TraversalError` for the client
//! - Map each error kind to its status code
//!
//! # Design Decisions
//! - JSON body `{"error": ..., "code": ...}` so clients can branch on `code`
//! - Used as the router's error handler unless one is supplied

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::traversal::TraversalError;

/// Body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

impl From<&TraversalError> for ErrorBody {
    fn from(err: &TraversalError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
        }
    }
}

impl IntoResponse for TraversalError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}

/// Error handler used when the router is built without one.
pub async fn default_error_handler(_request: Request<Body>, err: TraversalError) -> Response {
    err.into_response()
}
