use crate::models::DataResponse;
use crate::validation::GatewayRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::Result;
use tracing::info;
use waypoint::LookupService;

/// action=searchText — pure search, never cached.
pub async fn search_text(lookups: &LookupService, request: &GatewayRequest) -> Result<Response> {
    let params = request.text_search()?;
    info!(text_query = %params.text_query, "searchText");

    let data = lookups.search_text(&params).await?;
    Ok(Json(DataResponse { data }).into_response())
}

/// action=nearbySearch — pure search, never cached.
pub async fn search_nearby(lookups: &LookupService, request: &GatewayRequest) -> Result<Response> {
    let params = request.nearby_search()?;
    info!(lat = params.lat, lng = params.lng, radius = params.radius, "nearbySearch");

    let data = lookups.search_nearby(&params).await?;
    Ok(Json(DataResponse { data }).into_response())
}
