//! FlashFS - An Ephemeral In-Memory File Store
//!
//! This is the main entry point for the FlashFS server.
//! It sets up the store engine, the HTTP API, and shuts both down on a signal.

use anyhow::Context;
use clap::Parser;
use flashfs::api::{build_router, ApiServer};
use flashfs::config::Config;
use flashfs::service::FileService;
use flashfs::storage::StoreEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_banner(config: &Config) {
    println!(
        r#"
FlashFS v{} - Ephemeral In-Memory File Store
──────────────────────────────────────────────────────────────
Server started on {}
Download URLs look like {}<key>

Use Ctrl+C to shutdown gracefully.
"#,
        flashfs::VERSION,
        config.bind_address(),
        config.base_url,
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse flags and environment
    let config = Config::parse();

    // Set up logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    print_banner(&config);

    // Create and start the store engine
    let store = Arc::new(StoreEngine::new(config.store_config()));
    store.start()?;

    let service = FileService::new(Arc::clone(&store), config.base_url.clone());
    let router = build_router(service, &config.api_config());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("cannot listen on {}", config.bind_address()))?;
    info!("Listening on {}", config.bind_address());

    let served = ApiServer::new(router, config.graceful_shutdown())
        .serve(listener, shutdown_signal())
        .await;

    // Stop the store even if the server failed
    store.stop().await;

    served.context("HTTP server error")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to listen for SIGTERM");
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

    info!("Shutdown signal received, stopping server...");
}
