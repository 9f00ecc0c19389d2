use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::metrics::SearchMetrics;
use crate::service::SearchService;

use super::handlers::*;

/// Application state shared across all handlers
pub struct AppState {
    pub service: Arc<SearchService>,
    pub metrics: Arc<SearchMetrics>,
}

impl AppState {
    pub fn new(service: Arc<SearchService>) -> Self {
        let metrics = Arc::clone(service.metrics());
        Self { service, metrics }
    }
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Snapshot-dependent reads
        .route("/status", get(status))
        .route("/search", get(search))
        // Rebuild trigger
        .route("/refresh", post(refresh))
        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(CompressionLayer::new())
        // compression only adds it for bodies large enough to compress
        .layer(SetResponseHeaderLayer::if_not_present(
            header::VARY,
            HeaderValue::from_static("accept-encoding"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
