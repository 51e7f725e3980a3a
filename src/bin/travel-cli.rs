use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::{json, Value};

use travel_router::config::load_config;
use travel_router::traversal::{tokenize_uri_path, traverse};
use travel_router::tree::JsonFileTree;

#[derive(Parser)]
#[command(name = "travel-cli")]
#[command(about = "Inspect traversal routing for a travel-router deployment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a path offline against the configured tree
    Resolve {
        #[arg(short, long, default_value = "travel.toml")]
        config: PathBuf,

        /// Request verb, selects the subpath limit
        method: String,

        /// Request path, e.g. /accounts/users/mary
        path: String,
    },
    /// Send a request to a running server and print the response
    Request {
        #[arg(short, long, default_value = "http://127.0.0.1:8000")]
        url: String,

        method: String,

        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { config, method, path } => {
            let config = load_config(&config)?;
            let tree = JsonFileTree::load(Path::new(&config.tree.path)).await?;
            let tokens = tokenize_uri_path(&path)?;
            let limit = config.traversal.subpath_limit(&method.to_ascii_uppercase());

            let output = match traverse(&tree, &tokens, limit, config.traversal.strict_traversal) {
                Ok(traversal) => json!({
                    "tokens": tokens,
                    "limit": limit.to_string(),
                    "handler": traversal.handler,
                    "current": traversal.current,
                    "subpath": traversal.subpath,
                }),
                Err(e) => json!({
                    "tokens": tokens,
                    "limit": limit.to_string(),
                    "error": e.to_string(),
                    "code": e.code(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Request { url, method, path } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let client = reqwest::Client::new();
            let res = client
                .request(method, format!("{}{}", url.trim_end_matches('/'), path))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let request_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    println!("{} (request id {})", status, request_id);

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
