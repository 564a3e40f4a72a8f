use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry {
    payload: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
    // Keys in insertion order. Slots for keys that were since overwritten or
    // purged are skipped when they surface at the front.
    order: VecDeque<String>,
}

/// Bounded in-memory response cache. Expired entries are purged by the read
/// that discovers them; an insertion over the cap evicts the oldest-inserted
/// surviving entry. One instance lives for the whole process, shared via
/// `Arc` behind a mutex.
pub struct ResponseCache {
    inner: Mutex<Inner>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            max_entries,
        }
    }

    /// Returns the stored payload if present and unexpired. The read that
    /// finds an expired entry deletes it.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();

        let expired = matches!(inner.entries.get(key), Some(entry) if entry.is_expired(now));
        if expired {
            inner.entries.remove(key);
            debug!(key, "cache entry expired");
            return None;
        }

        match inner.entries.get(key) {
            Some(entry) => {
                debug!(key, "cache hit");
                Some(entry.payload.clone())
            }
            None => {
                debug!(key, "cache miss");
                None
            }
        }
    }

    /// Stores `payload` under `key`, unconditionally overwriting and
    /// re-stamping the key's insertion position, then evicts while over the
    /// capacity cap.
    pub async fn put(&self, key: String, payload: Value) {
        let mut inner = self.inner.lock().await;
        let expires_at = Instant::now() + self.ttl;

        inner.entries.insert(key.clone(), CacheEntry { payload, expires_at });
        inner.order.retain(|k| k != &key);
        inner.order.push_back(key);

        while inner.entries.len() > self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            if inner.entries.remove(&oldest).is_some() {
                debug!(key = %oldest, "evicted oldest entry over capacity");
            }
        }
    }

    /// Number of live (unexpired) entries, reported by the health operation.
    pub async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        let now = Instant::now();
        inner
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }
}
