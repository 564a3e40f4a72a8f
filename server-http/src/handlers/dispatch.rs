use crate::handlers::{autocomplete, details, health, search};
use crate::models::error_response;
use crate::state::AppState;
use crate::validation::GatewayRequest;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use shared::{Error, Result};
use tracing::info;

const GATEWAY_KEY_HEADER: &str = "x-gateway-key";

/// The six allowed gateway operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    SearchText,
    NearbySearch,
    Details,
    Autocomplete,
    BatchDetails,
    Health,
}

impl Action {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "searchText" => Some(Action::SearchText),
            "nearbySearch" => Some(Action::NearbySearch),
            "details" => Some(Action::Details),
            "autocomplete" => Some(Action::Autocomplete),
            "batchDetails" => Some(Action::BatchDetails),
            "health" => Some(Action::Health),
            _ => None,
        }
    }
}

/// OPTIONS / — CORS preflight, no content.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET|POST / — the single gateway endpoint; the `action` parameter selects
/// the operation. No state survives a request: every path terminates in a
/// shaped response here.
pub async fn dispatch(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body_json = (!body.is_empty())
        .then(|| serde_json::from_slice::<Value>(&body).ok())
        .flatten();
    let request = GatewayRequest::new(query, body_json);

    match run(&state, &request, &headers).await {
        Ok(response) => response,
        Err(err) => error_response(err),
    }
}

/// Validation order matters: the action allow-list is checked before any
/// credential, the caller credential before the health short-circuit, and
/// the provider credential only for operations that reach upstream.
async fn run(state: &AppState, request: &GatewayRequest, headers: &HeaderMap) -> Result<Response> {
    let name = request.action().unwrap_or_default();
    let action = Action::parse(name).ok_or_else(|| Error::InvalidAction(name.to_string()))?;

    authenticate(state, headers)?;

    info!(action = name, "dispatching gateway request");

    match action {
        Action::Health => Ok(health::health(state).await.into_response()),
        Action::SearchText => search::search_text(state.require_lookups()?, request).await,
        Action::NearbySearch => search::search_nearby(state.require_lookups()?, request).await,
        Action::Details => details::details(state.require_lookups()?, request).await,
        Action::BatchDetails => details::batch_details(state.require_lookups()?, request).await,
        Action::Autocomplete => autocomplete::autocomplete(state.require_lookups()?, request).await,
    }
}

/// Compares `x-gateway-key` against the configured shared secret. An unset
/// secret rejects every caller.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let supplied = headers
        .get(GATEWAY_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    match (&state.config.gateway_key, supplied) {
        (Some(secret), Some(key)) if key == secret => Ok(()),
        _ => Err(Error::Unauthorized),
    }
}
