use shared::config::Config;
use shared::Error;
use std::sync::Arc;
use std::time::Duration;
use waypoint::ports::PlacesApi;
use waypoint::{GooglePlacesClient, LookupService, ResponseCache};

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<ResponseCache>,
    /// None when the provider API key is not configured; every non-health
    /// operation then reports the server configuration fault.
    lookups: Option<Arc<LookupService>>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        let cache = Arc::new(ResponseCache::new(
            Duration::from_secs(config.cache_ttl_seconds),
            config.cache_max_entries,
        ));
        let lookups = config.google_api_key.as_ref().map(|key| {
            let upstream: Arc<dyn PlacesApi> = Arc::new(GooglePlacesClient::new(key.clone()));
            Arc::new(LookupService::new(cache.clone(), upstream))
        });
        Self {
            config,
            cache,
            lookups,
        }
    }

    /// State with an explicit upstream implementation, used by tests.
    pub fn with_upstream(config: Arc<Config>, upstream: Arc<dyn PlacesApi>) -> Self {
        let cache = Arc::new(ResponseCache::new(
            Duration::from_secs(config.cache_ttl_seconds),
            config.cache_max_entries,
        ));
        let lookups = Some(Arc::new(LookupService::new(cache.clone(), upstream)));
        Self {
            config,
            cache,
            lookups,
        }
    }

    pub fn require_lookups(&self) -> shared::Result<&LookupService> {
        self.lookups.as_deref().ok_or(Error::MissingProviderKey)
    }
}
