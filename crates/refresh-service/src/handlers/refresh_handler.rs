use crate::errors::RefreshError;
use crate::services::JwtRefreshService;
use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub refresh_service: Arc<JwtRefreshService>,
}

/// Handler for POST /api/v1/admin/token/refresh
///
/// Reads the `Authorization: Bearer <token>` header and returns the
/// refreshed token as a JSON string.
#[tracing::instrument(skip_all, name = "refresh.http.admin_token")]
pub async fn refresh_admin_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<String>, RefreshError> {
    let token = state.refresh_service.refresh_admin_token(&headers)?;
    Ok(Json(token))
}

/// Liveness probe.
pub async fn health_check() -> &'static str {
    "OK"
}
