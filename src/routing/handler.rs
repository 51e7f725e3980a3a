//! Handler seams.
//!
//! Handlers and error handlers are async callables that receive the request
//! and produce the response themselves; the router never looks at what they
//! return beyond converting it with `IntoResponse`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::{BoxFuture, FutureExt};

use crate::routing::context::Context;
use crate::traversal::TraversalError;

/// A request handler selected by traversal.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request<Body>, context: Context) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>, Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn call(&self, request: Request<Body>, context: Context) -> BoxFuture<'static, Response> {
        (self)(request, context).map(IntoResponse::into_response).boxed()
    }
}

/// Receives every traversal, provider and dispatch failure.
pub trait ErrorHandler: Send + Sync + 'static {
    fn call(&self, request: Request<Body>, error: TraversalError) -> BoxFuture<'static, Response>;
}

impl<F, Fut> ErrorHandler for F
where
    F: Fn(Request<Body>, TraversalError) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn call(&self, request: Request<Body>, error: TraversalError) -> BoxFuture<'static, Response> {
        (self)(request, error).map(IntoResponse::into_response).boxed()
    }
}

/// Handler name to handler. `""` is a valid name.
#[derive(Clone, Default)]
pub struct HandlerMap {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, handler: impl Handler) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for HandlerMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerMap")
            .field("handlers", &self.names())
            .finish()
    }
}
