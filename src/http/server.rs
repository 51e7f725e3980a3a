//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum app with a catch-all that hands requests to the
//!   traversal router
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener, stop on shutdown signal
//! - Rebuild the traversal router when the configuration changes

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router as AxumRouter,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::routing::Router;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ArcSwap<Router>>,
}

/// HTTP front end for a traversal router.
pub struct HttpServer {
    app: AxumRouter,
    router: Arc<ArcSwap<Router>>,
}

impl HttpServer {
    /// Create a new HTTP server serving `router`.
    ///
    /// The router's options are replaced by `config.traversal` only when a
    /// config update arrives; the router is used as built here.
    pub fn new(config: AppConfig, router: Router) -> Self {
        let router = Arc::new(ArcSwap::from_pointee(router));
        let state = AppState {
            router: Arc::clone(&router),
        };
        let app = Self::build_app(&config, state);
        Self { app, router }
    }

    /// Build the axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &AppConfig, state: AppState) -> AxumRouter {
        AxumRouter::new()
            .fallback(traversal_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// The axum app, for embedding or driving directly in tests.
    pub fn app(&self) -> AxumRouter {
        self.app.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Config updates rebuild the router with the new traversal options; an
    /// update whose options fail validation is logged and dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let router = Arc::clone(&self.router);
        let reload_task = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_config(&router, new_config);
            }
        });

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reload_task.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Swap in a router rebuilt with `config.traversal`.
pub fn apply_config(router: &ArcSwap<Router>, config: AppConfig) {
    match router.load().with_options(config.traversal) {
        Ok(rebuilt) => {
            tracing::info!(
                strict = rebuilt.options().strict_traversal,
                default_handler = rebuilt.options().use_default_handler,
                "Traversal options reloaded"
            );
            router.store(Arc::new(rebuilt));
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected traversal options, keeping current router");
        }
    }
}

/// Catch-all handler: every request goes through traversal.
async fn traversal_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let router = state.router.load_full();
    router.serve(request).await
}
