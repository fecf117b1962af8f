//! Forum URLs - pretty-URL rewriting service for forum links
//!
//! Turns internal query strings such as `g=topics&f=12&p=3` into readable
//! paths like `/yaf_topics12p3_General-Discussion.aspx`, resolving entity
//! names through a range-bucketed cache with jittered TTL expiry.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod slug;
pub mod source;
pub mod tasks;
pub mod url;

pub use api::AppState;
pub use cache::NameCache;
pub use config::Config;
pub use error::{Result, UrlError};
pub use query::QueryParams;
pub use slug::slugify;
pub use source::{EntityKind, MemoryNameSource, NameRow, NameSource};
pub use tasks::spawn_cleanup_task;
pub use url::{PlainUrlBuilder, RequestContext, RewriteUrlBuilder, UrlBuilder};
