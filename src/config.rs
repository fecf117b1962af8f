//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Width of the ID range fetched and cached per bucket
    pub bucket_size: u64,
    /// Script file that marks a standard deployment (rewriting applies)
    pub base_script_file: String,
    /// Script name used when it is not overridden
    pub script_name: String,
    /// Build rewritten links; plain script links otherwise
    pub rewrite_urls: bool,
    /// Script name that replaces the request's own when set
    pub force_script_name: Option<String>,
    /// Application root the forum is mounted under
    pub app_root: Option<String>,
    /// Scheme and host prepended by full URLs
    pub base_url: String,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// JSON file seeding the in-memory name store
    pub names_file: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BUCKET_SIZE` - IDs per cache bucket (default: 500)
    /// - `BASE_SCRIPT_FILE` - Script file enabling rewriting (default: default.aspx)
    /// - `SCRIPT_NAME` - Request script name (default: default.aspx)
    /// - `REWRITE_URLS` - Build rewritten links (default: true)
    /// - `FORCE_SCRIPT_NAME` - Overrides the script name (default: unset)
    /// - `APP_ROOT` - Application root path (default: unset, i.e. `/`)
    /// - `BASE_URL` - Base server URL (default: http://localhost)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `NAMES_FILE` - Seed file for the name store (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bucket_size: parse_var("BUCKET_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.bucket_size),
            base_script_file: env::var("BASE_SCRIPT_FILE").unwrap_or(defaults.base_script_file),
            script_name: env::var("SCRIPT_NAME").unwrap_or(defaults.script_name),
            rewrite_urls: parse_var("REWRITE_URLS").unwrap_or(defaults.rewrite_urls),
            force_script_name: non_empty_var("FORCE_SCRIPT_NAME"),
            app_root: non_empty_var("APP_ROOT"),
            base_url: env::var("BASE_URL").unwrap_or(defaults.base_url),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            names_file: non_empty_var("NAMES_FILE"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_size: 500,
            base_script_file: "default.aspx".to_string(),
            script_name: "default.aspx".to_string(),
            rewrite_urls: true,
            force_script_name: None,
            app_root: None,
            base_url: "http://localhost".to_string(),
            server_port: 3000,
            cleanup_interval: 60,
            names_file: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
