use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use shared::Error;
use waypoint::domain::BatchOutcome;
use waypoint::lookup::upstream_body_json;

// === Success envelopes ===

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    #[serde(rename = "cacheEntries")]
    pub cache_entries: usize,
}

#[derive(Serialize)]
pub struct DataResponse {
    pub data: Value,
}

#[derive(Serialize)]
pub struct DetailsResponse {
    pub data: Value,
    pub cached: bool,
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchOutcome>,
}

// === Error envelope ===

/// Maps the shared error taxonomy onto the wire: a stable machine-readable
/// code per fault, with upstream failures mirroring the provider's status
/// and carrying its raw body through.
pub fn error_response(err: Error) -> Response {
    let (status, body) = match err {
        Error::InvalidAction(_) => (StatusCode::BAD_REQUEST, json!({"error": "invalid_action"})),
        Error::MissingField(field) => (
            StatusCode::BAD_REQUEST,
            json!({"error": format!("missing_{field}")}),
        ),
        Error::BatchTooLarge(max) => (
            StatusCode::BAD_REQUEST,
            json!({"error": format!("too_many_placeIds_max_{max}")}),
        ),
        Error::Unauthorized => (StatusCode::UNAUTHORIZED, json!({"error": "unauthorized"})),
        Error::MissingProviderKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "missing_google_api_key"}),
        ),
        Error::Upstream { status, body } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            json!({"error": "google_error", "body": upstream_body_json(&body)}),
        ),
        Error::Internal(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "gateway_exception", "message": message}),
        ),
    };
    (status, Json(body)).into_response()
}
