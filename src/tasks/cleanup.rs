//! TTL Cleanup Task
//!
//! Background task that periodically removes expired name buckets, so ranges
//! nobody asks for again do not linger until their next lookup.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::NameCache;

/// Spawns a background task that periodically drops expired buckets.
///
/// The task sleeps for the given interval between sweeps. Lookups keep
/// running during a sweep; the cache synchronizes per bucket.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let names = Arc::new(NameCache::new(source, 500));
/// let cleanup_handle = spawn_cleanup_task(names.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(names: Arc<NameCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting bucket cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = names.cleanup_expired();

            if removed > 0 {
                info!("Bucket cleanup: removed {} expired buckets", removed);
            } else {
                debug!("Bucket cleanup: no expired buckets found");
            }
        }
    })
}
