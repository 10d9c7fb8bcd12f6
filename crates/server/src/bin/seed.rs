//! Load the sample clinical dataset into the configured graph database.
//!
//! Destructive: every existing node and relationship is deleted first.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aegis_server::config::Config;
use aegis_server::db::{GraphDb, Neo4jStore, seed};

#[tokio::main]
async fn main() {
    // .env may set RUST_LOG
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let store = Neo4jStore::new(GraphDb::new(config.graph.clone()));
    let result = match store.db().connect().await {
        Ok(()) => seed::seed_database(&store).await,
        Err(e) => Err(e),
    };
    store.db().close().await;

    match result {
        Ok(summary) => tracing::info!(
            removed = summary.removed,
            nodes = summary.nodes,
            interactions = summary.interactions,
            links = summary.links,
            "Seeding complete"
        ),
        Err(e) => {
            tracing::error!(error = %e, "Seeding failed");
            std::process::exit(1);
        }
    }
}
