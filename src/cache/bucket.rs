//! Cache Bucket Module
//!
//! A bucket holds the names of one entity kind for one fixed-width ID range,
//! together with the time it stops being trusted.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::source::{EntityKind, NameRow};

// == Range Helpers ==
/// Lowest ID of the range containing `id`.
pub fn low_range(id: u64, bucket_size: u64) -> u64 {
    (id / bucket_size) * bucket_size
}

/// First ID past the range containing `id`.
pub fn high_range(id: u64, bucket_size: u64) -> u64 {
    low_range(id, bucket_size).saturating_add(bucket_size)
}

// == Bucket Key ==
/// Identifies the bucket for `kind` covering `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub kind: EntityKind,
    pub low: u64,
    pub high: u64,
}

impl BucketKey {
    /// Key of the bucket an ID falls into.
    pub fn for_id(kind: EntityKind, id: u64, bucket_size: u64) -> Self {
        Self {
            kind,
            low: low_range(id, bucket_size),
            high: high_range(id, bucket_size),
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.low <= id && id < self.high
    }
}

// == Bucket ==
/// Names fetched for one key, immutable once built.
#[derive(Debug, Clone)]
pub struct Bucket {
    key: BucketKey,
    names: HashMap<u64, String>,
    /// When the bucket must be refetched
    pub expires_at: DateTime<Utc>,
}

impl Bucket {
    // == Constructor ==
    /// Builds a bucket from fetched rows, discarding rows outside the key's range.
    pub fn from_rows(
        key: BucketKey,
        rows: Vec<NameRow>,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let names = rows
            .into_iter()
            .filter(|row| key.contains(row.id))
            .map(|row| (row.id, row.name))
            .collect();

        Self {
            key,
            names,
            expires_at: created_at + ttl,
        }
    }

    pub fn key(&self) -> &BucketKey {
        &self.key
    }

    /// Name stored for `id`, if the fetch returned one.
    pub fn get(&self, id: u64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    // == Is Expired ==
    /// A bucket is expired once `now` reaches its expiration time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
