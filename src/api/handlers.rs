use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::api::types::*;
use crate::error::DocsiftError;
use crate::freshness::{check_freshness, format_http_date, parse_http_date, Freshness};
use crate::models::Timestamp;

use super::router::AppState;

const CACHE_CONTROL: &str = "public, max-age=120, must-revalidate";

/// Error wrapper for API handlers
pub enum ApiError {
    Docsift(DocsiftError),
}

impl From<DocsiftError> for ApiError {
    fn from(e: DocsiftError) -> Self {
        ApiError::Docsift(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Docsift(e) => {
                let (status, error_type) = match &e {
                    DocsiftError::UnknownCollection(_) => {
                        (StatusCode::BAD_REQUEST, "unknown_collection")
                    }
                    DocsiftError::WorkerUnavailable => {
                        (StatusCode::SERVICE_UNAVAILABLE, "refresh_unavailable")
                    }
                    DocsiftError::SourceLoad(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "source_load_error")
                    }
                    DocsiftError::MalformedSource { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "malformed_source")
                    }
                    DocsiftError::UnknownSourceProtocol(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "unknown_source_protocol")
                    }
                    DocsiftError::Json(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "serialization_error")
                    }
                    DocsiftError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
                    DocsiftError::Internal(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                    }
                };
                (status, error_type, e.to_string())
            }
        };

        let error_response = ErrorResponse::new(error_type, message);
        (status, Json(error_response)).into_response()
    }
}

fn if_modified_since(headers: &HeaderMap) -> Option<Timestamp> {
    headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_http_date)
}

/// Attach the validators and caching policy for a snapshot-dependent response
///
/// `Vary` is set by the router layers.
fn with_cache_headers(mut response: Response, built_at: Timestamp) -> Response {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&format_http_date(built_at)) {
        headers.insert(header::LAST_MODIFIED, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
    response
}

fn snapshot_response<T: Serialize>(built_at: Timestamp, body: T) -> Response {
    with_cache_headers((StatusCode::OK, Json(body)).into_response(), built_at)
}

fn not_modified(built_at: Timestamp) -> Response {
    with_cache_headers(StatusCode::NOT_MODIFIED.into_response(), built_at)
}

/// Sync record and loaded collections
pub async fn status(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let current = state.service.current();
    let built_at = current.snapshot.built_at;

    if check_freshness(built_at, if_modified_since(&headers)) == Freshness::NotModified {
        state.metrics.record_not_modified("status");
        return not_modified(built_at);
    }

    snapshot_response(built_at, StatusResponse::from(current.as_ref()))
}

/// Search one or more collections
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let params = SearchParams::from_pairs(pairs);
    let current = state.service.current();
    let built_at = current.snapshot.built_at;

    if check_freshness(built_at, if_modified_since(&headers)) == Freshness::NotModified {
        state.metrics.record_not_modified("search");
        return Ok(not_modified(built_at));
    }

    let query = params.q.as_deref().unwrap_or_default();
    let results = state
        .service
        .search_in(&current, query, params.search_property.as_deref())?;
    debug!(
        query = %query,
        scope = ?params.search_property,
        hits = results.results.len(),
        generation = current.snapshot.generation,
        "Search completed"
    );

    Ok(snapshot_response(built_at, results))
}

/// Schedule a rebuild and return without waiting for it
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.service.trigger_refresh()?;
    Ok(Json(RefreshResponse { refresh: outcome }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let buffer = state
        .metrics
        .encode()
        .map_err(|e| DocsiftError::Internal(format!("Failed to encode metrics: {}", e)))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        buffer,
    ))
}
