//! API Gateway
//!
//! Forwards fixed path prefixes to upstream services and serves a small
//! first-party API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ request id ─▶ trace ─▶ cors ─▶ security headers ─▶ body limit
//!                                                                            │
//!                         ┌──────────────────────────────────────────────────┘
//!                         ▼
//!                  ┌─────────────┐   GET /         ┌──────────────┐
//!                  │   router    │────────────────▶│ root message │
//!                  │             │   /api/v1/*     ┌──────────────┐
//!                  │             │────────────────▶│  local API   │
//!                  │             │   <prefix>/*    ┌──────────────┐   ┌───────────┐
//!                  │             │────────────────▶│ route table  │──▶│ transform │──▶ upstream
//!                  │             │   otherwise     ┌──────────────┐   └───────────┘
//!                  │             │────────────────▶│  404 JSON    │
//!                  └─────────────┘                 └──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::{loader, Secrets};
use api_gateway::observability::{logging, metrics};
use api_gateway::lifecycle::{signals, Shutdown};
use api_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Minimal configuration-driven HTTP API gateway", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when absent.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listener address, overriding the configuration.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `.env` never overrides variables already set in the environment
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = loader::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.environment,
        routes = config.routes.len(),
        local_api = %config.local_api.prefix,
        "Configuration loaded"
    );

    let secrets = Secrets::from_env(
        config
            .routes
            .iter()
            .filter_map(|route| route.transform.as_ref())
            .map(|transform| transform.secret_key()),
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, &secrets)?;
    let listener = TcpListener::bind(&bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
