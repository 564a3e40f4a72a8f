use crate::models::HealthResponse;
use crate::state::AppState;
use axum::Json;

/// action=health — liveness plus the current number of live cache entries.
/// Requires the caller credential but no provider credential.
pub async fn health(state: &AppState) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        cache_entries: state.cache.len().await,
    })
}
