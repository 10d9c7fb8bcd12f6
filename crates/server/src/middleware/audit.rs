//! Audit trail for graph writes

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::request_id::RequestId;

/// Kind of graph write a request performs, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphWrite {
    CreateNode,
    Link,
}

impl GraphWrite {
    fn as_str(self) -> &'static str {
        match self {
            GraphWrite::CreateNode => "create_node",
            GraphWrite::Link => "link",
        }
    }
}

/// `POST /api/v1/{collection}` creates a node, `PUT` under `/api/v1` links two.
/// Explanation requests are reads even though they are POSTs.
pub fn classify(method: &Method, path: &str) -> Option<GraphWrite> {
    let rest = path.strip_prefix("/api/v1/")?;
    let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    match (method, segments.as_slice()) {
        (&Method::POST, ["explanations"]) => None,
        (&Method::POST, [_collection]) => Some(GraphWrite::CreateNode),
        (&Method::PUT, [_, _, _, _]) => Some(GraphWrite::Link),
        _ => None,
    }
}

/// Log each graph write with the request id and the resulting status
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let Some(action) = classify(request.method(), request.uri().path()) else {
        return next.run(request).await;
    };
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    tracing::info!(
        target: "audit",
        request_id = %request_id,
        action = action.as_str(),
        path = %path,
        status = response.status().as_u16(),
        "Graph write"
    );
    response
}
