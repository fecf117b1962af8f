//! Bucket Store Module
//!
//! Keyed storage for cache buckets. Readers receive `Arc` snapshots, so a
//! bucket is either absent or fully populated from their point of view.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::cache::{Bucket, BucketKey};

// == Bucket Store ==
/// Get/set/invalidate contract the name cache keeps its buckets in.
pub trait BucketStore: Send + Sync {
    /// Returns the live bucket for `key`. An expired bucket is dropped and
    /// reported as a miss.
    fn get(&self, key: &BucketKey, now: DateTime<Utc>) -> Option<Arc<Bucket>>;

    /// Stores a bucket under its own key, replacing any previous one.
    fn set(&self, bucket: Arc<Bucket>);

    /// Drops the bucket for `key`, returning true if one was present.
    fn invalidate(&self, key: &BucketKey) -> bool;

    /// Drops every bucket expired at `now` and returns how many went.
    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize;

    /// Drops everything.
    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Memory Bucket Store ==
/// In-process bucket store backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct MemoryBucketStore {
    buckets: DashMap<BucketKey, Arc<Bucket>>,
}

impl MemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BucketStore for MemoryBucketStore {
    fn get(&self, key: &BucketKey, now: DateTime<Utc>) -> Option<Arc<Bucket>> {
        let bucket = self.buckets.get(key).map(|entry| Arc::clone(entry.value()))?;
        if bucket.is_expired(now) {
            // Only remove the bucket we saw; a concurrent refill may have replaced it.
            self.buckets
                .remove_if(key, |_, current| Arc::ptr_eq(current, &bucket));
            return None;
        }
        Some(bucket)
    }

    fn set(&self, bucket: Arc<Bucket>) {
        self.buckets.insert(*bucket.key(), bucket);
    }

    fn invalidate(&self, key: &BucketKey) -> bool {
        self.buckets.remove(key).is_some()
    }

    fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.is_expired(now));
        before.saturating_sub(self.buckets.len())
    }

    fn clear(&self) {
        self.buckets.clear();
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }
}
