use tracing::warn;

pub struct Config {
    pub host: String,
    pub http_port: u16,
    /// Provider credential. Absence is a server configuration fault reported
    /// per-request, never at startup.
    pub google_api_key: Option<String>,
    /// Shared secret expected in the `x-gateway-key` header. Unset means
    /// every caller-credential check fails.
    pub gateway_key: Option<String>,
    pub cache_ttl_seconds: u64,
    pub cache_max_entries: usize,
}

impl Config {
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;
    const DEFAULT_CACHE_MAX_ENTRIES: usize = 500;

    pub fn from_env() -> Self {
        let host = std::env::var("WAYPOINT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let http_port = std::env::var("WAYPOINT_HTTP_PORT")
            .unwrap_or_else(|_| Self::DEFAULT_HTTP_PORT.to_string())
            .parse::<u16>()
            .unwrap_or(Self::DEFAULT_HTTP_PORT);
        let cache_ttl_seconds = std::env::var("WAYPOINT_CACHE_TTL_SECONDS")
            .unwrap_or_else(|_| Self::DEFAULT_CACHE_TTL_SECONDS.to_string())
            .parse::<u64>()
            .unwrap_or(Self::DEFAULT_CACHE_TTL_SECONDS);
        let cache_max_entries = std::env::var("WAYPOINT_CACHE_MAX_ENTRIES")
            .unwrap_or_else(|_| Self::DEFAULT_CACHE_MAX_ENTRIES.to_string())
            .parse::<usize>()
            .unwrap_or(Self::DEFAULT_CACHE_MAX_ENTRIES);

        let gateway_key = std::env::var("GATEWAY_KEY").ok().filter(|k| !k.is_empty());
        if gateway_key.is_none() {
            warn!("GATEWAY_KEY not set, every request will be rejected as unauthorized");
        }

        Self {
            host,
            http_port,
            google_api_key: std::env::var("GOOGLE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            gateway_key,
            cache_ttl_seconds,
            cache_max_entries,
        }
    }
}
