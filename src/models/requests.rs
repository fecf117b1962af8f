//! Request DTOs for the URL service API
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

/// Longest internal query string accepted by GET /url
pub const MAX_QUERY_LENGTH: usize = 2048;

/// Query parameters for GET /url
///
/// # Fields
/// - `q`: The internal query string to turn into a link, e.g. `g=topics&f=12`
/// - `full`: Whether to prefix the base URL
#[derive(Debug, Clone, Deserialize)]
pub struct UrlRequest {
    /// Internal query string
    pub q: String,
    /// Absolute link when true
    #[serde(default)]
    pub full: bool,
}

impl UrlRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.q.trim().is_empty() {
            return Some("Query cannot be empty".to_string());
        }
        if self.q.len() > MAX_QUERY_LENGTH {
            return Some(format!(
                "Query exceeds maximum length of {} characters",
                MAX_QUERY_LENGTH
            ));
        }
        None
    }
}
