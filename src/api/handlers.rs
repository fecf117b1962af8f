//! API Handlers
//!
//! HTTP request handlers for each URL service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::NameCache;
use crate::config::Config;
use crate::error::{Result, UrlError};
use crate::models::{HealthResponse, InvalidateResponse, StatsResponse, UrlRequest, UrlResponse};
use crate::source::{EntityKind, NameSource};
use crate::url::{PlainUrlBuilder, RequestContext, RewriteUrlBuilder, UrlBuilder};

/// Application state shared across all handlers.
///
/// The name cache synchronizes internally, so handlers share it through an
/// `Arc` without an outer lock.
#[derive(Clone)]
pub struct AppState {
    /// Shared name cache
    pub names: Arc<NameCache>,
    /// Link builder selected by configuration
    pub builder: Arc<dyn UrlBuilder>,
    /// Deployment paths links are built against
    pub context: Arc<RequestContext>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(names: Arc<NameCache>, builder: Arc<dyn UrlBuilder>, context: RequestContext) -> Self {
        Self {
            names,
            builder,
            context: Arc::new(context),
        }
    }

    /// Creates a rewriting AppState over `source` with default settings.
    pub fn with_source(source: Arc<dyn NameSource>) -> Self {
        Self::from_config(&Config::default(), source)
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the name cache over `source` and picks the rewriting or plain
    /// builder according to the config.
    pub fn from_config(config: &Config, source: Arc<dyn NameSource>) -> Self {
        let names = Arc::new(NameCache::new(source, config.bucket_size));
        let builder: Arc<dyn UrlBuilder> = if config.rewrite_urls {
            Arc::new(RewriteUrlBuilder::from_config(Arc::clone(&names), config))
        } else {
            Arc::new(PlainUrlBuilder)
        };
        Self::new(names, builder, RequestContext::from_config(config))
    }
}

/// Handler for GET /url?q=...&full=...
///
/// Converts an internal query string into a link.
pub async fn url_handler(
    State(state): State<AppState>,
    Query(req): Query<UrlRequest>,
) -> Result<Json<UrlResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(UrlError::InvalidRequest(error_msg));
    }

    // Name lookups may hit the backing store synchronously.
    let builder = Arc::clone(&state.builder);
    let context = Arc::clone(&state.context);
    let query = req.q.clone();
    let full = req.full;
    let url = tokio::task::spawn_blocking(move || {
        if full {
            builder.build_url_full(&context, &query)
        } else {
            builder.build_url(&context, &query)
        }
    })
    .await
    .map_err(|err| UrlError::Internal(format!("URL build task failed: {}", err)))?;

    Ok(Json(UrlResponse::new(req.q, url)))
}

/// Handler for DELETE /cache/:entity/:id
///
/// Drops the cached bucket holding the entity so renamed items show up.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, u64)>,
) -> Result<Json<InvalidateResponse>> {
    let kind: EntityKind = entity.parse()?;
    let removed = state.names.invalidate(kind, id);

    Ok(Json(InvalidateResponse::new(kind, id, removed)))
}

/// Handler for GET /stats
///
/// Returns current name cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.names.stats()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
