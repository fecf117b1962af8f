//! URL Module
//!
//! Link generation: plain script links and rewritten, search-friendly paths.

mod builder;
mod rewrite;


pub use builder::{
    escape_ampersands, treat_base_url, treat_path, PlainUrlBuilder, RequestContext, UrlBuilder,
};
pub use rewrite::{RewriteUrlBuilder, FORUM_ROOT, REWRITE_EXTENSION, REWRITE_MARKER};
