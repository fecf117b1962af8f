//! Cache Module
//!
//! Range-bucketed cache of entity display names with jittered TTL expiry and
//! miss-driven invalidation.

mod bucket;
mod clock;
mod jitter;
mod names;
mod stats;
mod store;


// Re-export public types
pub use bucket::{high_range, low_range, Bucket, BucketKey};
pub use clock::{Clock, ManualClock, SystemClock};
pub use jitter::Jitter;
pub use names::NameCache;
pub use stats::{CacheStats, StatsCounters};
pub use store::{BucketStore, MemoryBucketStore};

// == Public Constants ==
/// IDs covered by one bucket unless configured otherwise
pub const DEFAULT_BUCKET_SIZE: u64 = 500;

/// Shortest bucket lifetime in seconds (5 minutes)
pub const MIN_TTL_SECS: i64 = 5 * 60;

/// Bucket lifetimes stay below this many seconds (15 minutes)
pub const MAX_TTL_SECS: i64 = 15 * 60;
