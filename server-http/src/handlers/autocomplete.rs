use crate::models::DataResponse;
use crate::validation::GatewayRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::Result;
use tracing::info;
use waypoint::LookupService;

/// action=autocomplete — cached lookup; the envelope carries no cached flag.
pub async fn autocomplete(lookups: &LookupService, request: &GatewayRequest) -> Result<Response> {
    let params = request.autocomplete()?;
    info!(input = %params.input, "autocomplete");

    let hit = lookups.autocomplete(&params).await?;
    Ok(Json(DataResponse { data: hit.data }).into_response())
}
