//! aegis-server library crate
//!
//! Exposes `build_app`, `config`, `db` and `ai` for the binaries and the
//! integration tests. The server entrypoint is in `main.rs`.

pub mod ai;
pub mod config;
pub mod db;
mod error;
mod middleware;
mod routes;
mod services;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ai::SharedCompletion;
use config::Config;
use db::SharedStore;
use error::AppError;
use middleware::ApiKeyAuth;

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so tests can construct the app without binding
/// to a TCP port.
pub fn build_app(store: SharedStore, completion: SharedCompletion, config: &Config) -> Router {
    let auth = ApiKeyAuth::new(config.api_key.clone());
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Domain routes (auth + rate limit)
    let protected_routes = Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(axum_mw::from_fn(middleware::auth_middleware))
        .layer(Extension(auth))
        .layer(Extension(completion))
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // build_recorder() + set_global_recorder() so repeated builds (tests)
    // keep working: only the first install wins.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let public_routes = Router::new()
        .route("/", get(routes::health::info))
        .route("/health", get(routes::health::check))
        .route("/api/v1/health", get(routes::health::check))
        .route("/ready", get(routes::health::ready))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(|| async { AppError::NotFound("No such route".to_string()) })
        .with_state(store)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
