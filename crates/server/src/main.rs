//! aegis-server: clinical decision support HTTP server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aegis_server::ai::ClaudeClient;
use aegis_server::config::{Config, redact_uri};
use aegis_server::db::{ClinicalStore, GraphDb, Neo4jStore};

#[tokio::main]
async fn main() {
    // .env may set RUST_LOG
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    if let Err(message) = run().await {
        tracing::error!(error = %message, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = Config::from_env().map_err(|e| e.to_string())?;

    // Connect to the graph database
    let store = Arc::new(Neo4jStore::new(GraphDb::new(config.graph.clone())));
    store.db().connect().await.map_err(|e| {
        format!(
            "graph database at {} is unreachable: {}",
            redact_uri(&config.graph.uri),
            e
        )
    })?;
    store.ensure_schema().await;

    let completion = ClaudeClient::new(&config.completion).map_err(|e| e.to_string())?;

    // Log startup info
    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!("API key authentication disabled (no API_KEY env var)");
    }
    tracing::info!(model = %completion.model(), "Explanation model configured");
    tracing::info!("Rate limiting: {} requests/second", config.rate_limit_rps);

    // Build application
    let app = aegis_server::build_app(store.clone(), Arc::new(completion), &config);

    // Start server
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|e| format!("invalid bind address {}: {}", config.bind_address, e))?;
    tracing::info!("Starting AegisCare Graph server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("failed to bind {}: {}", addr, e))?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    served.map_err(|e| e.to_string())?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
