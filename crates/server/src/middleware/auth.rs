//! Optional API key authentication

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use aegis_core::{ErrorKind, ErrorOutcome};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// API Key authentication state
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// Without a configured key every request is allowed
    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        match &self.api_key {
            None => true,
            Some(expected) => headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|provided| constant_time_eq(provided.as_bytes(), expected.as_bytes())),
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Reject requests without a valid `X-API-Key` when a key is configured
pub async fn auth_middleware(request: Request<Body>, next: Next) -> Response {
    let auth = request.extensions().get::<ApiKeyAuth>().cloned();

    if let Some(auth) = auth {
        if !auth.is_authorized(request.headers()) {
            tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid API key");
            let outcome = ErrorOutcome::new(ErrorKind::Unauthorized, "Missing or invalid API key");
            return (StatusCode::UNAUTHORIZED, Json(outcome)).into_response();
        }
    }

    next.run(request).await
}
