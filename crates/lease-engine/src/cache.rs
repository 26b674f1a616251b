//! Short-lived result cache
//!
//! Maps document identity + jurisdiction to a finished assessment so a
//! repeated request skips the generation call. Backed by a bounded moka
//! cache: entries expire after their TTL and the least valuable entries are
//! evicted once `max_capacity` is reached.

use std::time::{Duration, Instant};

use moka::future::Cache;
use moka::Expiry;
use sha2::{Digest, Sha256};
use shared_types::LeaseAnalysisResponse;
use tracing::debug;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default upper bound on stored assessments
pub const DEFAULT_MAX_ENTRIES: u64 = 1000;

const KEY_PREFIX: &str = "lease-analysis";

#[derive(Debug, Clone)]
struct CacheEntry {
    value: LeaseAnalysisResponse,
    ttl: Duration,
}

/// Each entry lives for the TTL it was stored with
struct EntryExpiry;

impl Expiry<String, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe, size-bounded TTL cache of assessments
#[derive(Clone)]
pub struct ResultCache {
    entries: Cache<String, CacheEntry>,
    default_ttl: Duration,
    max_capacity: u64,
}

impl ResultCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_capacity(default_ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(default_ttl: Duration, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self {
            entries,
            default_ttl,
            max_capacity,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn max_capacity(&self) -> u64 {
        self.max_capacity
    }

    /// Derive the cache key for a document and jurisdiction.
    ///
    /// Each field is length-prefixed before hashing and an absent region is
    /// tagged differently from any present one, so distinct inputs never
    /// share a key.
    pub fn generate_key(
        document_identity: &str,
        country_code: &str,
        region_code: Option<&str>,
    ) -> String {
        let mut hasher = Sha256::new();
        hash_field(&mut hasher, document_identity);
        hash_field(&mut hasher, country_code);
        match region_code {
            Some(region) => {
                hasher.update([1u8]);
                hash_field(&mut hasher, region);
            }
            None => hasher.update([0u8]),
        }

        format!("{}:{}", KEY_PREFIX, hex::encode(hasher.finalize()))
    }

    /// Look up a live entry. Expired entries are reported absent.
    pub async fn get(&self, key: &str) -> Option<LeaseAnalysisResponse> {
        let hit = self.entries.get(key).await.map(|entry| entry.value);
        if hit.is_none() {
            debug!("Cache miss: {}", key);
        }
        hit
    }

    /// Store a value for `ttl`, replacing any existing entry
    pub async fn set(&self, key: &str, value: LeaseAnalysisResponse, ttl: Duration) {
        self.entries
            .insert(key.to_string(), CacheEntry { value, ttl })
            .await;
    }

    /// Store a value with the cache's default TTL
    pub async fn insert(&self, key: &str, value: LeaseAnalysisResponse) {
        self.set(key, value, self.default_ttl).await;
    }

    /// Run pending expiry and eviction work now instead of lazily
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    /// Approximate entry count, exact after [`Self::run_pending_tasks`]
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        self.run_pending_tasks().await;
        self.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.entry_count())
            .field("default_ttl", &self.default_ttl)
            .field("max_capacity", &self.max_capacity)
            .finish()
    }
}

fn hash_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}
