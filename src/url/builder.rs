//! URL Builder Module
//!
//! The builder contract shared by plain and rewriting link generation, the
//! per-request context it needs, and the path helpers both use.

use crate::config::Config;

// == Request Context ==
/// Where the forum is served from for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Scheme and host without trailing slash, e.g. `https://example.org`
    pub base_url: String,
    /// Application path with leading and trailing slash, e.g. `/forum/`
    pub path: String,
    /// Script file the request hit, e.g. `default.aspx`
    pub script_name: String,
}

impl RequestContext {
    /// Builds a context, normalizing the base URL and application root.
    pub fn new(base_url: &str, app_root: Option<&str>, script_name: impl Into<String>) -> Self {
        Self {
            base_url: treat_base_url(base_url),
            path: treat_path(app_root),
            script_name: script_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.base_url,
            config.app_root.as_deref(),
            config.script_name.clone(),
        )
    }

    /// `<path><script>?<query>` with no rewriting applied.
    pub fn plain_url(&self, query: &str) -> String {
        format!("{}{}?{}", self.path, self.script_name, query)
    }
}

// == Url Builder ==
/// Turns an internal query string into a link.
pub trait UrlBuilder: Send + Sync {
    /// Site-relative link for `query`.
    fn build_url(&self, ctx: &RequestContext, query: &str) -> String;

    /// Absolute link: the base URL followed by [`UrlBuilder::build_url`].
    fn build_url_full(&self, ctx: &RequestContext, query: &str) -> String {
        format!("{}{}", ctx.base_url, self.build_url(ctx, query))
    }
}

// == Plain Url Builder ==
/// Links straight to the script with the query attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainUrlBuilder;

impl UrlBuilder for PlainUrlBuilder {
    fn build_url(&self, ctx: &RequestContext, query: &str) -> String {
        escape_ampersands(&ctx.plain_url(query))
    }
}

// == Path Helpers ==
/// Encodes every `&` as `&amp;` exactly once, whatever the input already held.
pub fn escape_ampersands(url: &str) -> String {
    url.replace("&amp;", "&").replace('&', "&amp;")
}

/// Normalizes an application root into `/segment/.../`.
///
/// No root means `/`. A leading `~` stands for the application root. Missing
/// leading or trailing slashes are added and doubled slashes collapsed.
pub fn treat_path(app_root: Option<&str>) -> String {
    let mut path = match app_root.map(str::trim).filter(|root| !root.is_empty()) {
        Some(root) => {
            let mut root = match root.strip_prefix('~') {
                Some(rest) => format!("/{}", rest),
                None => root.to_string(),
            };
            if !root.starts_with('/') {
                root.insert(0, '/');
            }
            root
        }
        None => "/".to_string(),
    };

    if !path.ends_with('/') {
        path.push('/');
    }
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    path
}

/// Drops a single trailing `/` from a base URL.
pub fn treat_base_url(base_url: &str) -> String {
    base_url.strip_suffix('/').unwrap_or(base_url).to_string()
}
