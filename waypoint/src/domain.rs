use serde::Serialize;
use serde_json::Value;

/// Resource-name prefix the provider sometimes attaches to place ids.
const PLACE_RESOURCE_PREFIX: &str = "places/";

/// Hard upper bound on identifiers per batched details request.
pub const MAX_BATCH_SIZE: usize = 50;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_RADIUS_METERS: f64 = 1000.0;
pub const DEFAULT_MAX_RESULT_COUNT: u32 = 20;

/// Response fields requested from the provider when the caller supplies
/// none. Single source for both the single and batched details paths.
pub const DEFAULT_DETAIL_FIELDS: &[&str] = &[
    "id",
    "displayName",
    "formattedAddress",
    "location",
    "rating",
    "userRatingCount",
    "priceLevel",
    "types",
    "websiteUri",
    "internationalPhoneNumber",
    "regularOpeningHours",
];

/// Projection sent on the POST search endpoints, which reject requests
/// without an explicit field mask.
pub const SEARCH_FIELDS: &str = "places.id,places.displayName,places.formattedAddress,places.location,places.rating,places.userRatingCount,places.types";

/// Provider-assigned place identifier, held in raw form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceId(String);

impl PlaceId {
    /// Accepts both `ChIJ...` and `places/ChIJ...`; both forms normalize to
    /// the same identifier, so they share a cache entry.
    pub fn normalize(raw: &str) -> Self {
        let id = raw.strip_prefix(PLACE_RESOURCE_PREFIX).unwrap_or(raw);
        Self(id.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field paths requested from upstream for a details lookup. Caller order is
/// preserved on the wire; cache keys use the sorted form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMask {
    fields: Vec<String>,
}

impl FieldMask {
    /// Parses a comma-separated `fields` value. Empty specs yield `None` so
    /// callers fall back to the default mask.
    pub fn parse(spec: &str) -> Option<Self> {
        let fields: Vec<String> = spec
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            None
        } else {
            Some(Self { fields })
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Comma-joined form for the `fields` query parameter and the mirrored
    /// field-mask header.
    pub fn as_query(&self) -> String {
        self.fields.join(",")
    }

    pub fn is_default(&self) -> bool {
        let mut sorted = self.fields.clone();
        sorted.sort_unstable();
        let mut default_sorted: Vec<&str> = DEFAULT_DETAIL_FIELDS.to_vec();
        default_sorted.sort_unstable();
        sorted == default_sorted
    }
}

impl Default for FieldMask {
    fn default() -> Self {
        Self {
            fields: DEFAULT_DETAIL_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Deterministic cache key from the operation discriminator, the normalized
/// subject and the field list. Field order must not matter, so the list is
/// sorted before the key is built.
pub fn cache_key(operation: &str, subject: &str, fields: &[String]) -> String {
    let mut sorted: Vec<&str> = fields.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("{operation}:{subject}:{}", sorted.join(","))
}

#[derive(Clone, Debug)]
pub struct TextSearchParams {
    pub text_query: String,
    pub region_code: Option<String>,
    pub page_size: u32,
    pub language_code: Option<String>,
    pub included_type: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NearbySearchParams {
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
    pub included_type: Option<String>,
    pub max_result_count: u32,
}

#[derive(Clone, Debug)]
pub struct AutocompleteParams {
    pub input: String,
    pub language_code: Option<String>,
    pub region_code: Option<String>,
    pub types: Option<String>,
}

impl AutocompleteParams {
    /// Optional parameters in `k=v` form, filling the field-list slot of the
    /// cache key so requests differing only in options stay distinct.
    pub fn key_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if let Some(language) = &self.language_code {
            fields.push(format!("languageCode={language}"));
        }
        if let Some(region) = &self.region_code {
            fields.push(format!("regionCode={region}"));
        }
        if let Some(types) = &self.types {
            fields.push(format!("types={types}"));
        }
        fields
    }
}

/// Per-identifier result of a batched details lookup. A failed item is data
/// in the envelope, never a batch-level failure.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Hit {
        #[serde(rename = "placeId")]
        place_id: String,
        data: Value,
        cached: bool,
    },
    Failed {
        #[serde(rename = "placeId")]
        place_id: String,
        error: bool,
        status: u16,
        body: Value,
    },
}
