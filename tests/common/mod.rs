//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use travel_router::routing::{ErrorHandler, Handler};
use travel_router::{Context, ResourceTree, TraversalError};

/// `{"foo": {"bar": {"baz": {}, "%handler": "bar"}}}`
pub fn foo_tree() -> ResourceTree {
    tree(json!({ "foo": { "bar": { "baz": {}, "%handler": "bar" } } }))
}

/// `{"accounts": {"users": {"mary": {"%handler": "user"}}}}`
pub fn accounts_tree() -> ResourceTree {
    tree(json!({ "accounts": { "users": { "mary": { "%handler": "user" } } } }))
}

pub fn tree(value: Value) -> ResourceTree {
    ResourceTree::try_from(value).expect("fixture tree must be an object")
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// A handler that answers with its own registered name.
pub fn named(name: &'static str) -> impl Handler {
    move |_request: Request<Body>, _ctx: Context| async move { name }
}

/// A handler that answers with its name plus what traversal handed it.
pub fn echo(name: &'static str) -> impl Handler {
    move |_request: Request<Body>, ctx: Context| async move {
        Json(json!({
            "invoked": name,
            "handler": ctx.handler_name(),
            "path": ctx.path(),
            "subpath": ctx.subpath(),
            "current": ctx.current(),
        }))
    }
}

/// Error handler answering `error:<kind>` with the error's status.
pub fn kind_error_handler() -> impl ErrorHandler {
    |_request: Request<Body>, err: TraversalError| async move {
        (err.status(), format!("error:{}", err.kind()))
    }
}

/// Counts invocations of wrapped handlers.
#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn handler(&self, name: &'static str) -> impl Handler {
        let calls = self.0.clone();
        move |_request: Request<Body>, _ctx: Context| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { name }
        }
    }

    pub fn error_handler(&self) -> impl ErrorHandler {
        let calls = self.0.clone();
        move |_request: Request<Body>, err: TraversalError| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { err.into_response() }
        }
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("JSON body")
}

pub async fn status_and_text(response: Response) -> (StatusCode, String) {
    let status = response.status();
    (status, body_text(response).await)
}
