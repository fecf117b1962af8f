//! API Module
//!
//! HTTP handlers and routing for the URL service REST API.
//!
//! # Endpoints
//! - `GET /url` - Build a link from an internal query string
//! - `DELETE /cache/:entity/:id` - Invalidate cached names
//! - `GET /stats` - Get name cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
