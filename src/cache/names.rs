//! Name Cache Module
//!
//! Resolves entity IDs to display names, fetching whole ID ranges from the
//! name source on a miss and keeping them for a jittered TTL.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{
    Bucket, BucketKey, BucketStore, CacheStats, Clock, Jitter, MemoryBucketStore, StatsCounters,
    SystemClock, DEFAULT_BUCKET_SIZE,
};
use crate::error::Result;
use crate::source::{EntityKind, NameSource};

// == Name Cache ==
/// Range-bucketed cache in front of a [`NameSource`].
///
/// One instance is shared by all request handlers. Concurrent misses on the
/// same bucket may each fetch; the last insert wins.
pub struct NameCache {
    source: Arc<dyn NameSource>,
    store: Arc<dyn BucketStore>,
    clock: Arc<dyn Clock>,
    jitter: Jitter,
    bucket_size: u64,
    stats: StatsCounters,
}

impl NameCache {
    // == Constructor ==
    /// Creates a cache over `source` with the wall clock, entropy-seeded
    /// jitter and an in-memory bucket store. A zero bucket size becomes 1.
    pub fn new(source: Arc<dyn NameSource>, bucket_size: u64) -> Self {
        Self {
            source,
            store: Arc::new(MemoryBucketStore::new()),
            clock: Arc::new(SystemClock),
            jitter: Jitter::new(),
            bucket_size: bucket_size.max(1),
            stats: StatsCounters::new(),
        }
    }

    /// Cache with the default bucket size of 500.
    pub fn with_default_size(source: Arc<dyn NameSource>) -> Self {
        Self::new(source, DEFAULT_BUCKET_SIZE)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn BucketStore>) -> Self {
        self.store = store;
        self
    }

    pub fn bucket_size(&self) -> u64 {
        self.bucket_size
    }

    // == Resolve ==
    /// Returns the display name for `id`, or an empty string if the source
    /// has no such row.
    ///
    /// A cached bucket that lacks `id` is treated as stale: it is dropped and
    /// refetched once. A missing row after that is a normal outcome.
    pub fn resolve(&self, kind: EntityKind, id: u64) -> Result<String> {
        let key = BucketKey::for_id(kind, id, self.bucket_size);
        let now = self.clock.now();

        if let Some(bucket) = self.store.get(&key, now) {
            if let Some(name) = bucket.get(id) {
                self.stats.record_hit();
                return Ok(name.to_string());
            }
            debug!(%kind, id, low = key.low, high = key.high, "ID missing from cached bucket, invalidating");
            self.store.invalidate(&key);
            self.stats.record_invalidation();
        }

        self.stats.record_miss();
        let bucket = self.fill(key)?;
        Ok(bucket.get(id).unwrap_or_default().to_string())
    }

    fn fill(&self, key: BucketKey) -> Result<Arc<Bucket>> {
        let rows = self.source.fetch_range(key.kind, key.low, self.bucket_size)?;
        self.stats.record_fetch();

        let now = self.clock.now();
        let ttl = self.jitter.ttl();
        let bucket = Arc::new(Bucket::from_rows(key, rows, now, ttl));
        debug!(
            kind = %key.kind,
            low = key.low,
            high = key.high,
            rows = bucket.len(),
            ttl_secs = ttl.num_seconds(),
            "Filled name bucket"
        );

        self.store.set(Arc::clone(&bucket));
        Ok(bucket)
    }

    // == Invalidate ==
    /// Drops the bucket holding `id`, e.g. after the entity was renamed.
    ///
    /// Returns true if a bucket was cached.
    pub fn invalidate(&self, kind: EntityKind, id: u64) -> bool {
        let key = BucketKey::for_id(kind, id, self.bucket_size);
        let removed = self.store.invalidate(&key);
        if removed {
            self.stats.record_invalidation();
        }
        removed
    }

    /// Drops every cached bucket.
    pub fn clear(&self) {
        self.store.clear();
    }

    // == Cleanup Expired ==
    /// Removes expired buckets and returns how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let removed = self.store.cleanup_expired(self.clock.now());
        self.stats.record_expirations(removed);
        removed
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.store.len())
    }

    /// Number of buckets currently cached.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl std::fmt::Debug for NameCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameCache")
            .field("bucket_size", &self.bucket_size)
            .field("clock", &self.clock)
            .field("buckets", &self.store.len())
            .finish()
    }
}
