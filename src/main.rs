//! travel-router
//!
//! Serves a JSON resource tree over HTTP using traversal routing.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ axum (request id, trace, timeout)
//!                        │
//!                        ▼
//!                  routing::Router ──▶ TreeProvider (JSON file, read per request)
//!                        │
//!                        ▼
//!                  traversal engine ──▶ (handler name, current node, subpath)
//!                        │
//!            ┌───────────┼──────────────┐
//!            ▼           ▼              ▼
//!         handler   default handler  error handler
//! ```
//!
//! Demo handlers:
//! - `""`: the current node, path and subpath as JSON
//! - `children`: child keys of the current node
//! - `parent`: the parent of the current node, via `Context::walk_back`

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use travel_router::config::{load_config, AppConfig, ConfigWatcher};
use travel_router::lifecycle::Shutdown;
use travel_router::observability::{logging, metrics};
use travel_router::tree::{JsonFileTree, HANDLER_KEY};
use travel_router::{Context, HttpServer, Router};

#[derive(Parser)]
#[command(name = "travel-router")]
#[command(about = "Traversal-routed HTTP server for a JSON resource tree", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "travel.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_found = args.config.exists();
    let config = if config_found {
        load_config(&args.config)?
    } else {
        AppConfig::default()
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("travel-router v{} starting", env!("CARGO_PKG_VERSION"));
    if !config_found {
        tracing::warn!(path = ?args.config, "Config file not found, using defaults");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        tree = %config.tree.path,
        strict = config.traversal.strict_traversal,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let router = Router::builder(JsonFileTree::new(&config.tree.path))
        .handler("", show_node)
        .handler("children", list_children)
        .handler("parent", show_parent)
        .options(config.traversal.clone())
        .build()?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // Hot reload only makes sense for a config that came from a file.
    let (watcher, config_updates) = ConfigWatcher::new(&args.config);
    let _watcher = if config_found {
        match watcher.run() {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!(error = %e, "Config hot reload disabled");
                None
            }
        }
    } else {
        None
    };

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, router);
    let server_task = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    shutdown.trigger_on_signal().await?;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn show_node(_request: Request<Body>, ctx: Context) -> Json<serde_json::Value> {
    Json(json!({
        "handler": ctx.handler_name(),
        "path": ctx.path(),
        "subpath": ctx.subpath(),
        "current": ctx.current(),
    }))
}

async fn list_children(_request: Request<Body>, ctx: Context) -> Response {
    match ctx.current().as_subtree() {
        Some(children) => {
            let keys: Vec<&str> = children
                .keys()
                .map(String::as_str)
                .filter(|key| *key != HANDLER_KEY)
                .collect();
            Json(keys).into_response()
        }
        None => (StatusCode::CONFLICT, "current node has no children").into_response(),
    }
}

async fn show_parent(_request: Request<Body>, ctx: Context) -> Response {
    // Drop the subpath, the view name and the current node's own segment.
    let steps = (ctx.subpath().len() + 2).min(ctx.path().len());
    match ctx.walk_back(steps) {
        Ok(parent) => Json(parent).into_response(),
        Err(e) => e.into_response(),
    }
}
