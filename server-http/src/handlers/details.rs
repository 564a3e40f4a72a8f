use crate::models::{BatchResponse, DetailsResponse};
use crate::validation::GatewayRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::Result;
use tracing::info;
use waypoint::LookupService;

/// action=details — cache-first single lookup with the field-mask fallback.
pub async fn details(lookups: &LookupService, request: &GatewayRequest) -> Result<Response> {
    let (place_id, fields) = request.details()?;
    info!(%place_id, "details");

    let hit = lookups.details(&place_id, &fields).await?;
    Ok(Json(DetailsResponse {
        data: hit.data,
        cached: hit.cached,
    })
    .into_response())
}

/// action=batchDetails — concurrent per-id lookups; per-item failures are
/// data in the 200 envelope, never a batch failure.
pub async fn batch_details(lookups: &LookupService, request: &GatewayRequest) -> Result<Response> {
    let place_ids = request.place_ids()?;
    let fields = request.field_mask();
    info!(count = place_ids.len(), "batchDetails");

    let results = lookups.batch_details(&place_ids, &fields).await?;
    Ok(Json(BatchResponse { results }).into_response())
}
