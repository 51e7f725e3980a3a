//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for requests that lack one
//! - Echo the ID on the response
//! - Let handlers read the ID back
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept, not replaced

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Access to the request ID header.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&str> {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }
}
