//! HTTP routes for the refresh service.

use crate::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application routes.
///
/// - `POST /api/v1/admin/token/refresh` - refresh an admin bearer token
/// - `GET /health` - liveness probe
/// - `GET /metrics` - Prometheus scrape endpoint
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/v1/admin/token/refresh",
            post(handlers::refresh_admin_token),
        )
        .route("/health", get(handlers::health_check))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
}

/// Install the global Prometheus recorder and return its handle.
///
/// # Errors
///
/// Returns an error if a recorder is already installed.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Refresh is local crypto work; keep resolution in the low milliseconds
        .set_buckets_for_metric(
            Matcher::Prefix("refresh_token_refresh".to_string()),
            &[0.0005, 0.001, 0.0025, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250],
        )
        .map_err(|e| format!("Failed to set refresh duration buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus metrics recorder: {e}"))
}
