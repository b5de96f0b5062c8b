//! # Middleware Module
//!
//! Rate limiting and response timing for the fitscope HTTP API.
//!
//! ## Configuration
//!
//! - `[server] rate_limit` / `FITSCOPE_RATE_LIMIT`: requests per second (0 disables)
//! - `[server] cache_max_age`: `Cache-Control` max-age for successful responses

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default rate limit: 100 requests per second.
const DEFAULT_RPS: NonZeroU32 = match NonZeroU32::new(100) {
    Some(rps) => rps,
    None => NonZeroU32::MIN,
};

static SERVER_TIMING: HeaderName = HeaderName::from_static("server-timing");

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a new global rate limiter.
///
/// A zero rate falls back to the default of 100 requests per second.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(DEFAULT_RPS);
    let quota = Quota::per_second(rps);
    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware.
///
/// Returns 429 Too Many Requests if the limit is exceeded.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Rate limit exceeded");
            Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"))
        }
    }
}

// =============================================================================
// TIMING + CACHE HEADERS
// =============================================================================

/// Render a duration as milliseconds with microsecond precision.
pub fn format_millis(elapsed: Duration) -> String {
    let micros = elapsed.as_micros();
    format!("{}.{:03}", micros / 1000, micros % 1000)
}

/// Adds `Server-Timing: req;dur=<ms>` to every response and
/// `Cache-Control: max-age=<n>` to successful ones, then logs the request
/// URI with its elapsed time.
pub async fn timing_middleware(
    State(cache_max_age): State<u32>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let uri = request.uri().to_string();
    let start = Instant::now();

    let mut response = next.run(request).await;

    let elapsed = format_millis(start.elapsed());
    if let Ok(value) = HeaderValue::from_str(&format!("req;dur={}", elapsed)) {
        response.headers_mut().insert(SERVER_TIMING.clone(), value);
    }
    if cache_max_age > 0
        && response.status().is_success()
        && let Ok(value) = HeaderValue::from_str(&format!("max-age={}", cache_max_age))
    {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }

    tracing::info!(
        status = response.status().as_u16(),
        "{}: {}ms",
        uri,
        elapsed
    );
    response
}

// =============================================================================
// TESTS
// =============================================================================
