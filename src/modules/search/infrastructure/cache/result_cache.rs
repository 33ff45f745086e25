use crate::modules::catalog::Card;
use crate::shared::utils::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Rendering of the popularity sentinel in logs and stats
pub const POPULAR_KEY: &str = "__popular__";

/// Cache key: normalized query text, or the sentinel for "no query text"
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Popular,
    Query(String),
}

impl CacheKey {
    /// Trimmed text; blank text maps to the popularity sentinel
    pub fn from_query(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            CacheKey::Popular
        } else {
            CacheKey::Query(trimmed.to_string())
        }
    }

    pub fn is_popular(&self) -> bool {
        matches!(self, CacheKey::Popular)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Popular => f.write_str(POPULAR_KEY),
            CacheKey::Query(q) => f.write_str(q),
        }
    }
}

/// Raw (unranked) result set for one key
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub data: Vec<Card>,
    pub timestamp: DateTime<Utc>,
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries_count: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

/// Time-bounded store of raw result sets, keyed by normalized query.
///
/// Entries are only ever replaced whole. Nothing is purged: staleness is
/// checked at read time and a stale entry stays available through
/// [`ResultCache::get_any`] as the fallback for failed fetches.
pub struct ResultCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cache on the wall clock
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh result set for `key`, if any
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Card>> {
        match self.entries.get(key) {
            Some(entry) if self.is_fresh(&entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache entry for key {} is stale", key);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for key: {}", key);
                None
            }
        }
    }

    /// Result set for `key` regardless of age
    pub fn get_any(&self, key: &CacheKey) -> Option<Vec<Card>> {
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    /// Full entry for `key`, including its timestamp
    pub fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Store (or replace) the result set for `key`, stamped with the current time
    pub fn put(&self, key: CacheKey, data: Vec<Card>) {
        debug!("Caching {} cards for key: {}", data.len(), key);
        let entry = CacheEntry {
            key: key.clone(),
            data,
            timestamp: self.clock.now(),
        };
        self.entries.insert(key, entry);
    }

    /// `now - timestamp < ttl`. A timestamp in the future counts as fresh.
    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        match (self.clock.now() - entry.timestamp).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries_count: self.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all cached entries and counters
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        info!("Result cache cleared");
    }
}
