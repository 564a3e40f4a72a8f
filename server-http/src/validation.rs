use serde_json::{Map, Value};
use shared::{Error, Result};
use waypoint::domain::{
    AutocompleteParams, FieldMask, NearbySearchParams, PlaceId, TextSearchParams,
    DEFAULT_MAX_RESULT_COUNT, DEFAULT_PAGE_SIZE, DEFAULT_RADIUS_METERS,
};

/// Flat parameter bag merged from the query string and the JSON body, with
/// typed extraction into validated per-operation parameters. Every missing
/// required field is a 400 with a stable machine-readable code.
pub struct GatewayRequest {
    params: Map<String, Value>,
}

impl GatewayRequest {
    /// Body values win over query-string duplicates.
    pub fn new(query: Vec<(String, String)>, body: Option<Value>) -> Self {
        let mut params = Map::new();
        for (key, value) in query {
            params.insert(key, Value::String(value));
        }
        if let Some(Value::Object(body)) = body {
            for (key, value) in body {
                params.insert(key, value);
            }
        }
        Self { params }
    }

    pub fn action(&self) -> Option<&str> {
        self.params.get("action").and_then(Value::as_str)
    }

    fn str_param(&self, key: &str) -> Option<String> {
        match self.params.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    fn f64_param(&self, key: &str) -> Option<f64> {
        match self.params.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn u32_param(&self, key: &str) -> Option<u32> {
        match self.params.get(key) {
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn text_search(&self) -> Result<TextSearchParams> {
        let text_query = self
            .str_param("textQuery")
            .ok_or(Error::MissingField("textQuery"))?;
        Ok(TextSearchParams {
            text_query,
            region_code: self.str_param("regionCode"),
            page_size: self.u32_param("pageSize").unwrap_or(DEFAULT_PAGE_SIZE),
            language_code: self.str_param("languageCode"),
            included_type: self.str_param("includedType"),
        })
    }

    pub fn nearby_search(&self) -> Result<NearbySearchParams> {
        let (Some(lat), Some(lng)) = (self.f64_param("lat"), self.f64_param("lng")) else {
            return Err(Error::MissingField("lat_lng"));
        };
        Ok(NearbySearchParams {
            lat,
            lng,
            radius: self.f64_param("radius").unwrap_or(DEFAULT_RADIUS_METERS),
            included_type: self.str_param("includedType"),
            max_result_count: self
                .u32_param("maxResultCount")
                .unwrap_or(DEFAULT_MAX_RESULT_COUNT),
        })
    }

    pub fn details(&self) -> Result<(PlaceId, FieldMask)> {
        let place_id = self
            .str_param("placeId")
            .ok_or(Error::MissingField("placeId"))?;
        Ok((PlaceId::normalize(&place_id), self.field_mask()))
    }

    /// Caller-supplied comma-separated `fields`, or the shared default mask.
    pub fn field_mask(&self) -> FieldMask {
        self.str_param("fields")
            .and_then(|spec| FieldMask::parse(&spec))
            .unwrap_or_default()
    }

    /// Accepts a JSON array (body) or a comma-separated string (query). The
    /// batch size bound itself is enforced by the fan-out coordinator.
    pub fn place_ids(&self) -> Result<Vec<String>> {
        let ids: Vec<String> = match self.params.get("placeIds") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };
        if ids.is_empty() {
            return Err(Error::MissingField("placeIds"));
        }
        Ok(ids)
    }

    pub fn autocomplete(&self) -> Result<AutocompleteParams> {
        let input = self.str_param("input").ok_or(Error::MissingField("input"))?;
        Ok(AutocompleteParams {
            input,
            language_code: self.str_param("languageCode"),
            region_code: self.str_param("regionCode"),
            types: self.str_param("types"),
        })
    }
}
