use crate::cache::ResponseCache;
use crate::domain::{
    cache_key, AutocompleteParams, BatchOutcome, FieldMask, NearbySearchParams, PlaceId,
    TextSearchParams, MAX_BATCH_SIZE,
};
use crate::ports::PlacesApi;
use futures::future::join_all;
use serde_json::Value;
use shared::{Error, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Classification of a structured upstream failure, deciding whether the
/// one-shot field-mask fallback applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// The provider rejected the requested field expansion.
    FieldMask,
    Other,
}

impl UpstreamErrorKind {
    /// The provider reports a rejected field expansion as a 400 whose body
    /// names the fields parameter; it exposes no structural code for it, so
    /// the known failure text is matched here and nowhere else.
    pub fn classify(status: u16, body: &str) -> Self {
        if status == 400
            && (body.contains("Cannot find matching fields")
                || body.contains("Error expanding 'fields'")
                || body.to_ascii_lowercase().contains("field mask"))
        {
            UpstreamErrorKind::FieldMask
        } else {
            UpstreamErrorKind::Other
        }
    }
}

/// Upstream bodies are JSON when the provider produced them; anything else
/// passes through as a raw string.
pub fn upstream_body_json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// Outcome of a cache-aware lookup: the payload plus whether the cache
/// served it. Hit and miss are otherwise indistinguishable.
#[derive(Clone, Debug)]
pub struct CachedLookup {
    pub data: Value,
    pub cached: bool,
}

/// Orchestrates the cache, the upstream port and the fallback policy. One
/// instance per process, shared through the HTTP state.
#[derive(Clone)]
pub struct LookupService {
    cache: Arc<ResponseCache>,
    upstream: Arc<dyn PlacesApi>,
}

impl LookupService {
    pub fn new(cache: Arc<ResponseCache>, upstream: Arc<dyn PlacesApi>) -> Self {
        Self { cache, upstream }
    }

    /// Pure search, never cached.
    pub async fn search_text(&self, params: &TextSearchParams) -> Result<Value> {
        self.upstream.search_text(params).await
    }

    /// Pure search, never cached.
    pub async fn search_nearby(&self, params: &NearbySearchParams) -> Result<Value> {
        self.upstream.search_nearby(params).await
    }

    /// Single details lookup: cache first, then upstream with the field-mask
    /// fallback, then write-back with the standard TTL.
    pub async fn details(&self, place_id: &PlaceId, fields: &FieldMask) -> Result<CachedLookup> {
        let key = cache_key("details", place_id.as_str(), fields.fields());
        if let Some(data) = self.cache.get(&key).await {
            return Ok(CachedLookup { data, cached: true });
        }

        let data = self.details_with_fallback(place_id, fields).await?;
        self.cache.put(key, data.clone()).await;
        Ok(CachedLookup { data, cached: false })
    }

    /// Re-issues the call exactly once with the default mask when upstream
    /// rejected the supplied field expansion. Any other failure, and any
    /// failure of the retry itself, surfaces verbatim.
    async fn details_with_fallback(&self, place_id: &PlaceId, fields: &FieldMask) -> Result<Value> {
        match self.upstream.details(place_id, fields).await {
            Err(Error::Upstream { status, body })
                if UpstreamErrorKind::classify(status, &body) == UpstreamErrorKind::FieldMask =>
            {
                warn!(%place_id, status, "field mask rejected upstream, retrying with default mask");
                self.upstream.details(place_id, &FieldMask::default()).await
            }
            other => other,
        }
    }

    pub async fn autocomplete(&self, params: &AutocompleteParams) -> Result<CachedLookup> {
        let key = cache_key("autocomplete", &params.input, &params.key_fields());
        if let Some(data) = self.cache.get(&key).await {
            return Ok(CachedLookup { data, cached: true });
        }

        let data = self.upstream.autocomplete(params).await?;
        self.cache.put(key, data.clone()).await;
        Ok(CachedLookup { data, cached: false })
    }

    /// Concurrent per-identifier details lookups: one task per id, all joined
    /// before returning. The batch bound is validated before any per-item
    /// work starts; a single identifier's failure is recorded as data in its
    /// outcome and never cancels siblings. Outcomes come back in input order.
    pub async fn batch_details(
        &self,
        place_ids: &[String],
        fields: &FieldMask,
    ) -> Result<Vec<BatchOutcome>> {
        if place_ids.is_empty() {
            return Err(Error::MissingField("placeIds"));
        }
        if place_ids.len() > MAX_BATCH_SIZE {
            return Err(Error::BatchTooLarge(MAX_BATCH_SIZE));
        }

        debug!(count = place_ids.len(), "fanning out batch details");
        let tasks: Vec<_> = place_ids
            .iter()
            .map(|raw| {
                let service = self.clone();
                let place_id = PlaceId::normalize(raw);
                let fields = fields.clone();
                tokio::spawn(async move { service.lookup_one(place_id, fields).await })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(place_ids.len());
        for (raw, joined) in place_ids.iter().zip(join_all(tasks).await) {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => outcomes.push(BatchOutcome::Failed {
                    place_id: PlaceId::normalize(raw).as_str().to_string(),
                    error: true,
                    status: 500,
                    body: Value::String(format!("lookup task failed: {e}")),
                }),
            }
        }
        Ok(outcomes)
    }

    async fn lookup_one(&self, place_id: PlaceId, fields: FieldMask) -> BatchOutcome {
        match self.details(&place_id, &fields).await {
            Ok(hit) => BatchOutcome::Hit {
                place_id: place_id.as_str().to_string(),
                data: hit.data,
                cached: hit.cached,
            },
            Err(Error::Upstream { status, body }) => BatchOutcome::Failed {
                place_id: place_id.as_str().to_string(),
                error: true,
                status,
                body: upstream_body_json(&body),
            },
            Err(e) => BatchOutcome::Failed {
                place_id: place_id.as_str().to_string(),
                error: true,
                status: 500,
                body: Value::String(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const FIELD_MASK_REJECTION: &str =
        "Error expanding 'fields' parameter. Cannot find matching fields for path 'bogus'.";

    /// Scripted upstream double recording every details call and the mask it
    /// was made with.
    #[derive(Default)]
    struct ScriptedUpstream {
        details_calls: AtomicUsize,
        masks_seen: Mutex<Vec<String>>,
        reject_non_default_mask: bool,
        reject_all_masks: bool,
        not_found: Vec<String>,
    }

    impl ScriptedUpstream {
        fn call_count(&self) -> usize {
            self.details_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlacesApi for ScriptedUpstream {
        async fn search_text(&self, _params: &TextSearchParams) -> Result<Value> {
            Ok(json!({"places": []}))
        }

        async fn search_nearby(&self, _params: &NearbySearchParams) -> Result<Value> {
            Ok(json!({"places": []}))
        }

        async fn details(&self, place_id: &PlaceId, fields: &FieldMask) -> Result<Value> {
            self.details_calls.fetch_add(1, Ordering::SeqCst);
            self.masks_seen.lock().unwrap().push(fields.as_query());

            if self.not_found.iter().any(|id| id == place_id.as_str()) {
                return Err(Error::Upstream {
                    status: 404,
                    body: r#"{"error":{"status":"NOT_FOUND"}}"#.to_string(),
                });
            }
            if self.reject_all_masks || (self.reject_non_default_mask && !fields.is_default()) {
                return Err(Error::Upstream {
                    status: 400,
                    body: FIELD_MASK_REJECTION.to_string(),
                });
            }
            Ok(json!({"id": place_id.as_str(), "displayName": {"text": "Somewhere"}}))
        }

        async fn autocomplete(&self, params: &AutocompleteParams) -> Result<Value> {
            Ok(json!({"suggestions": [{"input": params.input}]}))
        }
    }

    fn service_with(upstream: ScriptedUpstream) -> (LookupService, Arc<ScriptedUpstream>) {
        let upstream = Arc::new(upstream);
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(60), 100));
        let service = LookupService::new(cache, upstream.clone());
        (service, upstream)
    }

    #[test]
    fn test_classify_field_mask_rejections() {
        assert_eq!(
            UpstreamErrorKind::classify(400, FIELD_MASK_REJECTION),
            UpstreamErrorKind::FieldMask
        );
        assert_eq!(
            UpstreamErrorKind::classify(400, "Invalid FIELD MASK supplied"),
            UpstreamErrorKind::FieldMask
        );
        // Same text under a different status is not the trigger.
        assert_eq!(
            UpstreamErrorKind::classify(403, FIELD_MASK_REJECTION),
            UpstreamErrorKind::Other
        );
        assert_eq!(
            UpstreamErrorKind::classify(400, "quota exceeded"),
            UpstreamErrorKind::Other
        );
    }

    #[test]
    fn test_upstream_body_json_passthrough() {
        assert_eq!(
            upstream_body_json(r#"{"error":{"code":404}}"#),
            json!({"error": {"code": 404}})
        );
        assert_eq!(upstream_body_json("plain text"), json!("plain text"));
    }

    #[tokio::test]
    async fn test_details_miss_then_hit() {
        let (service, upstream) = service_with(ScriptedUpstream::default());
        let id = PlaceId::normalize("ChIJabc");
        let mask = FieldMask::default();

        let first = service.details(&id, &mask).await.unwrap();
        assert!(!first.cached);

        let second = service.details(&id, &mask).await.unwrap();
        assert!(second.cached);
        assert_eq!(first.data, second.data);
        assert_eq!(upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_prefixed_and_raw_ids_share_a_cache_entry() {
        let (service, upstream) = service_with(ScriptedUpstream::default());
        let mask = FieldMask::default();

        service
            .details(&PlaceId::normalize("places/ChIJabc"), &mask)
            .await
            .unwrap();
        let second = service
            .details(&PlaceId::normalize("ChIJabc"), &mask)
            .await
            .unwrap();

        assert!(second.cached);
        assert_eq!(upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_field_mask_rejection_retries_once_with_default() {
        let (service, upstream) = service_with(ScriptedUpstream {
            reject_non_default_mask: true,
            ..Default::default()
        });
        let custom = FieldMask::parse("id,bogusField").unwrap();

        let result = service
            .details(&PlaceId::normalize("ChIJabc"), &custom)
            .await
            .unwrap();

        assert!(!result.cached);
        assert_eq!(upstream.call_count(), 2);
        let masks = upstream.masks_seen.lock().unwrap();
        assert_eq!(masks[0], "id,bogusField");
        assert_eq!(masks[1], FieldMask::default().as_query());
    }

    #[tokio::test]
    async fn test_fallback_failure_surfaces_without_further_retries() {
        let (service, upstream) = service_with(ScriptedUpstream {
            reject_all_masks: true,
            ..Default::default()
        });

        let result = service
            .details(&PlaceId::normalize("ChIJabc"), &FieldMask::parse("id,bogus").unwrap())
            .await;

        assert!(matches!(result, Err(Error::Upstream { status: 400, .. })));
        // Original call plus exactly one fallback, never a third.
        assert_eq!(upstream.call_count(), 2);
    }

    #[tokio::test]
    async fn test_non_field_mask_error_is_not_retried() {
        let (service, upstream) = service_with(ScriptedUpstream {
            not_found: vec!["ChIJgone".to_string()],
            ..Default::default()
        });

        let result = service
            .details(&PlaceId::normalize("ChIJgone"), &FieldMask::default())
            .await;

        assert!(matches!(result, Err(Error::Upstream { status: 404, .. })));
        assert_eq!(upstream.call_count(), 1);
    }

    #[tokio::test]
    async fn test_batch_isolates_per_item_failures() {
        let (service, upstream) = service_with(ScriptedUpstream {
            not_found: vec!["ChIJtwo".to_string()],
            ..Default::default()
        });
        let ids = vec![
            "ChIJone".to_string(),
            "ChIJtwo".to_string(),
            "ChIJthree".to_string(),
        ];

        let outcomes = service
            .batch_details(&ids, &FieldMask::default())
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(
            &outcomes[0],
            BatchOutcome::Hit { place_id, .. } if place_id == "ChIJone"
        ));
        assert!(matches!(
            &outcomes[1],
            BatchOutcome::Failed { place_id, status: 404, error: true, .. } if place_id == "ChIJtwo"
        ));
        assert!(matches!(
            &outcomes[2],
            BatchOutcome::Hit { place_id, .. } if place_id == "ChIJthree"
        ));
        assert_eq!(upstream.call_count(), 3);
    }

    #[tokio::test]
    async fn test_batch_rejects_over_fifty_ids_before_any_upstream_call() {
        let (service, upstream) = service_with(ScriptedUpstream::default());
        let ids: Vec<String> = (0..51).map(|i| format!("ChIJ{i}")).collect();

        let result = service.batch_details(&ids, &FieldMask::default()).await;

        assert!(matches!(result, Err(Error::BatchTooLarge(50))));
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_rejects_empty_id_list() {
        let (service, upstream) = service_with(ScriptedUpstream::default());

        let result = service.batch_details(&[], &FieldMask::default()).await;

        assert!(matches!(result, Err(Error::MissingField("placeIds"))));
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn test_second_batch_run_is_served_from_cache() {
        let (service, upstream) = service_with(ScriptedUpstream::default());
        let ids = vec!["ChIJone".to_string(), "places/ChIJtwo".to_string()];

        service
            .batch_details(&ids, &FieldMask::default())
            .await
            .unwrap();
        let rerun = service
            .batch_details(&ids, &FieldMask::default())
            .await
            .unwrap();

        assert_eq!(upstream.call_count(), 2);
        for outcome in &rerun {
            assert!(matches!(outcome, BatchOutcome::Hit { cached: true, .. }));
        }
    }

    #[tokio::test]
    async fn test_batch_outcome_keeps_normalized_id() {
        let (service, _upstream) = service_with(ScriptedUpstream::default());
        let ids = vec!["places/ChIJabc".to_string()];

        let outcomes = service
            .batch_details(&ids, &FieldMask::default())
            .await
            .unwrap();

        assert!(matches!(
            &outcomes[0],
            BatchOutcome::Hit { place_id, .. } if place_id == "ChIJabc"
        ));
    }

    #[tokio::test]
    async fn test_autocomplete_miss_then_hit() {
        let (service, _upstream) = service_with(ScriptedUpstream::default());
        let params = AutocompleteParams {
            input: "pizza".to_string(),
            language_code: Some("en".to_string()),
            region_code: None,
            types: None,
        };

        let first = service.autocomplete(&params).await.unwrap();
        let second = service.autocomplete(&params).await.unwrap();
        assert!(!first.cached);
        assert!(second.cached);

        // A different option set is a different cache entry.
        let other = AutocompleteParams {
            language_code: Some("fr".to_string()),
            ..params
        };
        assert!(!service.autocomplete(&other).await.unwrap().cached);
    }
}
