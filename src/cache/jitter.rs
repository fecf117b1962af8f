//! TTL Jitter Module
//!
//! Randomizes bucket lifetimes so buckets filled together do not all expire
//! and refetch at the same moment.

use std::sync::{Mutex, PoisonError};

use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cache::{MAX_TTL_SECS, MIN_TTL_SECS};

// == Jitter ==
/// Source of bucket TTLs, uniform in `[min, max)` seconds.
#[derive(Debug)]
pub struct Jitter {
    rng: Mutex<StdRng>,
    min_secs: i64,
    max_secs: i64,
}

impl Jitter {
    /// Entropy-seeded jitter over the default 5 to 15 minute window.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Reproducible jitter for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            min_secs: MIN_TTL_SECS,
            max_secs: MAX_TTL_SECS,
        }
    }

    /// Narrows or widens the window. An empty window yields `min` every time.
    pub fn with_window(mut self, min: Duration, max: Duration) -> Self {
        self.min_secs = min.num_seconds().max(0);
        self.max_secs = max.num_seconds().max(self.min_secs);
        self
    }

    // == TTL ==
    /// Draws the next bucket lifetime.
    pub fn ttl(&self) -> Duration {
        if self.max_secs <= self.min_secs {
            return Duration::seconds(self.min_secs);
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Duration::seconds(rng.gen_range(self.min_secs..self.max_secs))
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::new()
    }
}
