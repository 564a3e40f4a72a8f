use crate::domain::{
    AutocompleteParams, FieldMask, NearbySearchParams, PlaceId, TextSearchParams, SEARCH_FIELDS,
};
use crate::ports::PlacesApi;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use shared::{Error, Result};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://places.googleapis.com";

// Credential and mask travel in headers, never in the query string.
const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

/// Outbound client for the Places API (New). One method per operation kind,
/// each with a fixed endpoint shape; non-2xx responses come back as
/// structured upstream failures carrying the raw body.
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Points the client at an alternate host, used by tests with a stub
    /// server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    async fn decode(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<Value>()
                .await
                .map_err(|e| Error::Internal(format!("malformed upstream payload: {e}")))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Upstream {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn transport_error(e: reqwest::Error) -> Error {
        Error::Internal(format!("upstream request failed: {e}"))
    }
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn search_text(&self, params: &TextSearchParams) -> Result<Value> {
        let url = format!("{}/v1/places:searchText", self.base_url);
        let mut body = json!({
            "textQuery": params.text_query,
            "pageSize": params.page_size,
        });
        if let Some(region) = &params.region_code {
            body["regionCode"] = json!(region);
        }
        if let Some(language) = &params.language_code {
            body["languageCode"] = json!(language);
        }
        if let Some(included) = &params.included_type {
            body["includedType"] = json!(included);
        }

        debug!(%url, "searchText upstream call");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(FIELD_MASK_HEADER, SEARCH_FIELDS)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }

    async fn search_nearby(&self, params: &NearbySearchParams) -> Result<Value> {
        let url = format!("{}/v1/places:searchNearby", self.base_url);
        let mut body = json!({
            "locationRestriction": {
                "circle": {
                    "center": { "latitude": params.lat, "longitude": params.lng },
                    "radius": params.radius,
                }
            },
            "maxResultCount": params.max_result_count,
        });
        if let Some(included) = &params.included_type {
            body["includedTypes"] = json!([included]);
        }

        debug!(%url, "searchNearby upstream call");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(FIELD_MASK_HEADER, SEARCH_FIELDS)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }

    async fn details(&self, place_id: &PlaceId, fields: &FieldMask) -> Result<Value> {
        let url = format!("{}/v1/places/{}", self.base_url, place_id.as_str());
        let mask = fields.as_query();

        debug!(%url, mask = %mask, "details upstream call");
        let response = self
            .client
            .get(&url)
            .query(&[("fields", mask.as_str())])
            .header(API_KEY_HEADER, &self.api_key)
            .header(FIELD_MASK_HEADER, mask.as_str())
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }

    async fn autocomplete(&self, params: &AutocompleteParams) -> Result<Value> {
        let url = format!("{}/v1/places:autocomplete", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("input", params.input.as_str())];
        if let Some(language) = &params.language_code {
            query.push(("languageCode", language.as_str()));
        }
        if let Some(region) = &params.region_code {
            query.push(("regionCode", region.as_str()));
        }
        if let Some(types) = &params.types {
            query.push(("types", types.as_str()));
        }

        debug!(%url, "autocomplete upstream call");
        let response = self
            .client
            .get(&url)
            .query(&query)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(Self::transport_error)?;
        Self::decode(response).await
    }
}
