//! # fitscope HTTP API Module
//!
//! This module implements the HTTP JSON API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /fits` - Fits matching `ship`, repeated `item` and repeated `group` facets
//! - `GET /fit` - One fit by `id`, charges listed separately
//! - `GET /search` - Autocomplete over catalog item and group names
//! - `GET /status` - Catalog and store sizes
//! - `GET /health` - Health check
//!
//! ## Transport Policy
//!
//! - CORS: `GET` with `Content-Type`, preflight cached for an hour
//! - gzip compression when the client accepts it
//! - per-request timeout (`[server] request_timeout_secs`)
//! - `Server-Timing` on every response, `Cache-Control` on successful ones
//! - optional global rate limit (`FITSCOPE_RATE_LIMIT`)

mod handlers;
mod middleware;
mod types;

pub use handlers::{
    ApiError, fit_handler, fits_handler, health_handler, search_handler, status_handler,
};
pub use middleware::{GlobalRateLimiter, create_rate_limiter, format_millis};
pub use types::{
    EchoJson, ErrorResponse, FitDetailJson, FitSummaryJson, FitsResponse, HealthResponse,
    ItemJson, SearchHitJson, SearchResponse, StatusResponse, first_param, selection_from_pairs,
};

use crate::config::ServerConfig;
use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware as axum_middleware,
    routing::get,
};
use fitscope_core::{Engine, FitscopeError};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Preflight cache lifetime.
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. The engine is read-only, so no lock is needed.
#[derive(Clone, Debug)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the configured origins.
///
/// - `"*"` anywhere in the list: any origin
/// - otherwise: the listed origins; invalid entries are skipped
/// - nothing valid: localhost only
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(CORS_MAX_AGE);

    if origins.iter().any(|o| o.trim() == "*") {
        tracing::info!("CORS: Allowing all origins");
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            let trimmed = origin.trim();
            match trimmed.parse::<HeaderValue>() {
                Ok(hv) => {
                    tracing::info!("CORS: Allowing origin: {}", trimmed);
                    Some(hv)
                }
                Err(e) => {
                    tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if allowed.is_empty() {
        tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
        let localhost: Vec<HeaderValue> = [
            "http://localhost:3000",
            "http://localhost:8080",
            "http://127.0.0.1:3000",
            "http://127.0.0.1:8080",
        ]
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();
        return base.allow_origin(localhost);
    }

    base.allow_origin(allowed)
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - spans for every request
/// 2. CORS - answers preflight requests
/// 3. Timeout - 408 once the request deadline passes
/// 4. Compression - gzip when accepted
/// 5. Timing - `Server-Timing`, `Cache-Control`, request log
/// 6. Rate Limiting - if enabled
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/fits", get(handlers::fits_handler))
        .route("/fit", get(handlers::fit_handler))
        .route("/search", get(handlers::search_handler));

    if server.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", server.rate_limit);
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(server.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    let timeout = Duration::from_secs(server.request_timeout_secs);
    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(&server.cors_origins))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    timeout,
                ))
                .layer(CompressionLayer::new())
                .layer(axum_middleware::from_fn_with_state(
                    server.cache_max_age,
                    middleware::timing_middleware,
                )),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and serve until Ctrl+C.
pub async fn run_server(engine: Engine, server: &ServerConfig) -> Result<(), FitscopeError> {
    let addr = format!("{}:{}", server.host, server.port);
    let router = create_router(AppState::new(engine), server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FitscopeError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("fitscope HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| FitscopeError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
