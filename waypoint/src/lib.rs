pub mod cache;
pub mod domain;
pub mod google;
pub mod lookup;
pub mod ports;

// Re-export key types
pub use cache::ResponseCache;
pub use google::GooglePlacesClient;
pub use lookup::LookupService;
