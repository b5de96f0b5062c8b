//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Store access blocks, so every handler that touches the store hops onto
//! the blocking pool. Searches only read the in-memory catalog and run
//! inline.

use super::{
    AppState,
    types::{
        ErrorResponse, FitDetailJson, FitsResponse, HealthResponse, SearchResponse,
        StatusResponse, first_param, selection_from_pairs,
    },
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fitscope_core::{Engine, FitscopeError};
use std::sync::Arc;

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Handler error carrying a core error to the HTTP boundary.
#[derive(Debug)]
pub struct ApiError(pub FitscopeError);

impl From<FitscopeError> for ApiError {
    fn from(err: FitscopeError) -> Self {
        Self(err)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            FitscopeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FitscopeError::NotFound(_) => StatusCode::NOT_FOUND,
            FitscopeError::Store(_) | FitscopeError::Serialization(_) | FitscopeError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Run a store-bound engine call on the blocking pool.
async fn with_engine<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Engine) -> Result<T, FitscopeError> + Send + 'static,
{
    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || f(&engine))
        .await
        .map_err(|e| FitscopeError::Io(format!("Worker failed: {}", e)))?
        .map_err(ApiError::from)
}

// =============================================================================
// HEALTH / STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Catalog and store sizes.
pub async fn status_handler(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let fits = with_engine(&state, Engine::fit_count).await?;
    let catalog = state.engine.catalog();
    Ok(Json(StatusResponse {
        items: catalog.item_count(),
        groups: catalog.group_count(),
        fits,
    }))
}

// =============================================================================
// DATA ENDPOINTS
// =============================================================================

/// `GET /fits?ship=&item=&item=&group=`
pub async fn fits_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<FitsResponse>, ApiError> {
    let selection = selection_from_pairs(&pairs);
    let result = with_engine(&state, move |engine| engine.query(&selection)).await?;
    Ok(Json(FitsResponse::from(&result)))
}

/// `GET /fit?id=`
///
/// A repeated `id` resolves the first value.
pub async fn fit_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<FitDetailJson>, ApiError> {
    let id = first_param(&pairs, "id").map(str::to_owned);
    let fit = with_engine(&state, move |engine| engine.resolve_fit(id.as_deref())).await?;
    Ok(Json(FitDetailJson::from(&fit)))
}

/// `GET /search?term=`
pub async fn search_handler(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<SearchResponse> {
    let results = state.engine.search(first_param(&pairs, "term").unwrap_or_default());
    Json(SearchResponse::from(&results))
}

// =============================================================================
// TESTS
// =============================================================================
