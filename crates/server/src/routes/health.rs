//! Liveness, readiness and service info

use axum::{Json, extract::State};
use serde::Serialize;

use crate::db::SharedStore;
use crate::error::AppError;

pub const SERVICE_NAME: &str = "aegis-graph";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct ServiceInfo {
    service: &'static str,
    version: &'static str,
    description: &'static str,
    api: &'static str,
    health: &'static str,
}

/// GET /health - Process liveness, independent of the graph
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready - Verify the graph database answers
pub async fn ready(State(store): State<SharedStore>) -> Result<Json<HealthResponse>, AppError> {
    match store.ping().await {
        Ok(()) => Ok(Json(HealthResponse {
            status: "ready",
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            Err(AppError::Unavailable(format!("Graph database unavailable: {}", e)))
        }
    }
}

/// GET / - Service description
pub async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: "Clinical decision support over a patient knowledge graph",
        api: "/api/v1",
        health: "/health",
    })
}
