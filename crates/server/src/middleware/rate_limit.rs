//! Process-wide request throttling

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
};

use aegis_core::{ErrorKind, ErrorOutcome};

pub type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// One shared bucket refilled at `requests_per_second`; zero is treated as one
pub fn create_rate_limiter(requests_per_second: u32) -> SharedRateLimiter {
    let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rate)))
}

/// Answer 429 with `Retry-After` once the bucket is empty
pub async fn rate_limit_middleware(request: Request<Body>, next: Next) -> Response {
    let Some(limiter) = request.extensions().get::<SharedRateLimiter>().cloned() else {
        return next.run(request).await;
    };

    if let Err(not_until) = limiter.check() {
        let wait = not_until.wait_time_from(DefaultClock::default().now());
        let retry_after = wait.as_secs().max(1).to_string();
        tracing::warn!(path = %request.uri().path(), "Request throttled");
        let outcome = ErrorOutcome::new(
            ErrorKind::Throttled,
            "Too many requests. Please try again later.",
        );
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after)],
            Json(outcome),
        )
            .into_response();
    }

    next.run(request).await
}
