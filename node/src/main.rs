// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # C2P Relay Node
//!
//! Entry point for the `c2p-node` binary. Loads `.env`, parses CLI
//! arguments, validates the gateway configuration, opens the transaction
//! store, and serves the payment API and the metrics endpoint.
//!
//! - `run`     - start the relay
//! - `version` - print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use c2p_protocol::config::{RelayConfig, CIPHER_SCHEME};
use c2p_protocol::gateway::HttpGateway;
use c2p_protocol::storage::RelayDB;
use c2p_protocol::PaymentService;

use cli::{Commands, RelayCli};
use logging::LogFormat;
use metrics::RelayMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal in production.
    dotenvy::dotenv().ok();

    let cli = RelayCli::parse();

    match cli.command {
        Commands::Run(args) => run_relay(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the relay: payment API plus metrics endpoint.
async fn run_relay(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&args.log_format),
    );

    // --- Configuration ---
    let config = RelayConfig::from_settings(args.relay_settings())
        .context("invalid relay configuration")?;
    let config = Arc::new(config);

    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        data_dir = %args.data_dir.display(),
        merchant_id = %config.merchant_id,
        gateway = %config.gateway_url,
        "starting c2p-node"
    );

    // --- Persistent storage ---
    let db_path = args.data_dir.join("transactions");
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;

    let db = Arc::new(
        RelayDB::open(&db_path)
            .with_context(|| format!("failed to open database at {}", db_path.display()))?,
    );
    tracing::info!(
        path = %db_path.display(),
        records = db.record_count(),
        "database opened"
    );

    // --- Gateway client ---
    let gateway = Arc::new(
        HttpGateway::from_config(&config).context("failed to build gateway HTTP client")?,
    );

    // --- Metrics ---
    let relay_metrics = Arc::new(RelayMetrics::new().context("failed to register metrics")?);

    // --- Application state ---
    let app_state = api::AppState {
        service: PaymentService::new(config, gateway, Arc::clone(&db)),
        metrics: Arc::clone(&relay_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("payment API listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&relay_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    db.flush().context("failed to flush database on shutdown")?;
    tracing::info!("c2p-node stopped");
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("c2p-node {}", env!("CARGO_PKG_VERSION"));
    println!("cipher   {}", CIPHER_SCHEME);
    println!("rustc    {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
