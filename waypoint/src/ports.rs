use crate::domain::{AutocompleteParams, FieldMask, NearbySearchParams, PlaceId, TextSearchParams};
use async_trait::async_trait;
use serde_json::Value;
use shared::Result;

// Ports are the pluggable extension points for the places provider

/// Port for the upstream places provider. The core talks to upstream only
/// through this trait; tests plug in a scripted double. Implementations
/// perform no retries, retry policy belongs to the caller.
#[async_trait]
pub trait PlacesApi: Send + Sync + 'static {
    async fn search_text(&self, params: &TextSearchParams) -> Result<Value>;
    async fn search_nearby(&self, params: &NearbySearchParams) -> Result<Value>;
    async fn details(&self, place_id: &PlaceId, fields: &FieldMask) -> Result<Value>;
    async fn autocomplete(&self, params: &AutocompleteParams) -> Result<Value>;
}
