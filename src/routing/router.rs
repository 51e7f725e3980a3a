//! Request resolution and dispatch.
//!
//! # Responsibilities
//! - Normalize the request path into tokens; undecodable segments are not found
//! - Fetch the resource tree and run traversal with the verb's subpath limit
//! - Look up the elected handler, falling back to the default handler
//! - Invoke exactly one of: handler, default handler, error handler
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Built through `RouterBuilder`, which rejects a default handler that is
//!   not registered; dispatch can then never fail on it
//! - Explicit `NoMatch` rather than a sentinel handler name

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;

use crate::config::RouterOptions;
use crate::http::response::default_error_handler;
use crate::observability::metrics;
use crate::routing::context::Context;
use crate::routing::handler::{ErrorHandler, Handler, HandlerMap};
use crate::traversal::{tokenize, tokenize_uri_path, traverse, HandlerName, TraversalError, TraversalResult};
use crate::tree::TreeProvider;

/// Result of looking up a traversal's handler name.
enum Lookup<'a> {
    Found(&'a Arc<dyn Handler>),
    Fallback(&'a Arc<dyn Handler>),
    NoMatch,
}

/// How a request was answered. Used as the metrics outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Fallback,
    Failed(&'static str),
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Handled => "handled",
            Outcome::Fallback => "fallback",
            Outcome::Failed(kind) => kind,
        }
    }
}

/// Traversal router.
#[derive(Clone)]
pub struct Router {
    provider: Arc<dyn TreeProvider>,
    handlers: Arc<HandlerMap>,
    fallback: Option<Arc<dyn Handler>>,
    error_handler: Arc<dyn ErrorHandler>,
    options: Arc<RouterOptions>,
}

impl Router {
    /// Start building a router over `provider`.
    pub fn builder(provider: impl TreeProvider) -> RouterBuilder {
        RouterBuilder {
            provider: Arc::new(provider),
            handlers: HandlerMap::new(),
            error_handler: None,
            options: RouterOptions::default(),
        }
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn handlers(&self) -> &HandlerMap {
        &self.handlers
    }

    /// A router with the same provider and handlers but new options.
    ///
    /// Runs the same default-handler check as `RouterBuilder::build`.
    pub fn with_options(&self, options: RouterOptions) -> TraversalResult<Router> {
        let options = options.normalized();
        let fallback = resolve_fallback(&self.handlers, &options)?;
        Ok(Router {
            provider: Arc::clone(&self.provider),
            handlers: Arc::clone(&self.handlers),
            fallback,
            error_handler: Arc::clone(&self.error_handler),
            options: Arc::new(options),
        })
    }

    /// Resolve and answer one request.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let started = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let resolved = match tokenize_uri_path(&path) {
            Ok(tokens) => self.resolve(&method, tokens).await,
            // No resource is named by bytes that are not UTF-8.
            Err(invalid) => {
                tracing::debug!(method = %method, error = %invalid, "Undecodable path segment");
                Err(TraversalError::not_found(&tokenize(&path)))
            }
        };

        let (response, outcome) = match resolved {
            Ok((handler, outcome, context)) => {
                tracing::debug!(
                    method = %method,
                    path = ?context.path(),
                    handler = context.handler_name(),
                    subpath = ?context.subpath(),
                    outcome = outcome.as_str(),
                    "Dispatching request"
                );
                (handler.call(request, context).await, outcome)
            }
            Err(err) => {
                log_failure(&method, &err);
                let outcome = Outcome::Failed(err.kind());
                (self.error_handler.call(request, err).await, outcome)
            }
        };

        metrics::record_request(&method, outcome.as_str(), response.status().as_u16(), started);
        response
    }

    /// Traverse and pick the handler. Errors go to the error handler.
    async fn resolve(
        &self,
        method: &Method,
        tokens: Vec<String>,
    ) -> TraversalResult<(Arc<dyn Handler>, Outcome, Context)> {
        let tree = self
            .provider
            .fetch()
            .await
            .map_err(TraversalError::RootTree)?;
        let limit = self.options.subpath_limit(method.as_str());
        let traversal = traverse(&tree, &tokens, limit, self.options.strict_traversal)?;

        let (handler, outcome) = match self.lookup(&traversal.handler) {
            Lookup::Found(handler) => (Arc::clone(handler), Outcome::Handled),
            Lookup::Fallback(handler) => (Arc::clone(handler), Outcome::Fallback),
            Lookup::NoMatch => return Err(TraversalError::unknown_handler(&tokens)),
        };

        let context = Context::new(
            tree,
            tokens,
            traversal,
            method.clone(),
            Arc::clone(&self.provider),
            Arc::clone(&self.options),
        );
        Ok((handler, outcome, context))
    }

    fn lookup(&self, name: &HandlerName) -> Lookup<'_> {
        match (self.handlers.get(name.as_str()), &self.fallback) {
            (Some(handler), _) => Lookup::Found(handler),
            (None, Some(fallback)) => Lookup::Fallback(fallback),
            (None, None) => Lookup::NoMatch,
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("handlers", &self.handlers)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn log_failure(method: &Method, err: &TraversalError) {
    match err {
        TraversalError::NotFound { path } => {
            tracing::debug!(method = %method, path = ?path, "No resource for path")
        }
        TraversalError::UnknownHandler { path } => {
            tracing::warn!(method = %method, path = ?path, "Traversal resolved to an unregistered handler")
        }
        TraversalError::RootTree(e) => {
            tracing::error!(method = %method, error = %e, "Resource tree provider failed")
        }
        other => tracing::error!(method = %method, error = %other, "Traversal failed"),
    }
}

/// The default handler, when enabled. Errors if it is not registered.
fn resolve_fallback(
    handlers: &HandlerMap,
    options: &RouterOptions,
) -> TraversalResult<Option<Arc<dyn Handler>>> {
    if !options.use_default_handler {
        return Ok(None);
    }
    match handlers.get(&options.default_handler) {
        Some(handler) => Ok(Some(Arc::clone(handler))),
        None => Err(TraversalError::internal(format!(
            "default handler {:?} not found in handler map",
            options.default_handler
        ))),
    }
}

/// Collects the pieces of a `Router` and validates them together.
pub struct RouterBuilder {
    provider: Arc<dyn TreeProvider>,
    handlers: HandlerMap,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    options: RouterOptions,
}

impl RouterBuilder {
    /// Register a handler under `name`.
    pub fn handler(mut self, name: impl Into<String>, handler: impl Handler) -> Self {
        self.handlers.insert(name, handler);
        self
    }

    /// Replace the handler map wholesale.
    pub fn handlers(mut self, handlers: HandlerMap) -> Self {
        self.handlers = handlers;
        self
    }

    /// Error handler. Defaults to a JSON body carrying the error's status.
    pub fn error_handler(mut self, error_handler: impl ErrorHandler) -> Self {
        self.error_handler = Some(Arc::new(error_handler));
        self
    }

    pub fn options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate and build. Fails with `Internal` when the default handler is
    /// enabled but not registered.
    pub fn build(self) -> TraversalResult<Router> {
        let options = self.options.normalized();
        let fallback = resolve_fallback(&self.handlers, &options)?;

        tracing::debug!(
            handlers = ?self.handlers.names(),
            strict = options.strict_traversal,
            default_handler = ?options.use_default_handler.then_some(options.default_handler.as_str()),
            "Traversal router built"
        );

        Ok(Router {
            provider: self.provider,
            handlers: Arc::new(self.handlers),
            fallback,
            error_handler: self
                .error_handler
                .unwrap_or_else(|| Arc::new(default_error_handler) as Arc<dyn ErrorHandler>),
            options: Arc::new(options),
        })
    }
}
