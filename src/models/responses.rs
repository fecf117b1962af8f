//! Response DTOs for the URL service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::source::EntityKind;

/// Response body for GET /url
#[derive(Debug, Clone, Serialize)]
pub struct UrlResponse {
    /// The query string that was converted
    pub query: String,
    /// The resulting link
    pub url: String,
}

impl UrlResponse {
    pub fn new(query: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            url: url.into(),
        }
    }
}

/// Response body for DELETE /cache/:entity/:id
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Human readable outcome
    pub message: String,
    pub entity: EntityKind,
    pub id: u64,
    /// Whether a cached bucket was dropped
    pub removed: bool,
}

impl InvalidateResponse {
    pub fn new(entity: EntityKind, id: u64, removed: bool) -> Self {
        let message = if removed {
            format!("Cached {} names around id {} invalidated", entity, id)
        } else {
            format!("No cached {} names around id {}", entity, id)
        };
        Self {
            message,
            entity,
            id,
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Lookups served from cache
    pub hits: u64,
    /// Lookups that needed a fetch
    pub misses: u64,
    /// Range fetches issued
    pub fetches: u64,
    /// Buckets invalidated
    pub invalidations: u64,
    /// Buckets expired
    pub expirations: u64,
    /// Buckets currently cached
    pub total_buckets: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            fetches: stats.fetches,
            invalidations: stats.invalidations,
            expirations: stats.expirations,
            total_buckets: stats.total_buckets,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
