//! Rewrite Builder Module
//!
//! Produces search-friendly links such as `/yaf_topics12p3_General-Discussion.aspx`
//! from internal query strings, looking entity names up through the name cache.

use std::sync::Arc;

use tracing::warn;

use crate::cache::NameCache;
use crate::config::Config;
use crate::error::{Result, UrlError};
use crate::query::QueryParams;
use crate::slug::{slugify_with, EntityDecoder, HtmlDecode};
use crate::source::EntityKind;
use crate::url::{escape_ampersands, RequestContext, UrlBuilder};

/// Prefix of every rewritten page name
pub const REWRITE_MARKER: &str = "yaf_";

/// Extension of every rewritten page name
pub const REWRITE_EXTENSION: &str = ".aspx";

/// Rewritten name of the forum index, collapsed to the bare path
pub const FORUM_ROOT: &str = "yaf_forum.aspx";

const PAGE_KIND_KEY: &str = "g";
const PAGE_NUMBER_KEY: &str = "p";

// == Route ==
/// What a query string points at, decided by its page kind.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Route {
    /// Page name token written after the marker
    token: String,
    /// Parameter whose value follows the token; empty when none
    key: &'static str,
    /// Display name for the slug; empty when none
    description: String,
    /// Whether a page number parameter is folded into the path
    paged: bool,
}

impl Route {
    fn bare(token: impl Into<String>, paged: bool) -> Self {
        Self {
            token: token.into(),
            key: "",
            description: String::new(),
            paged,
        }
    }

    fn keyed(token: impl Into<String>, key: &'static str, description: String, paged: bool) -> Self {
        Self {
            token: token.into(),
            key,
            description,
            paged,
        }
    }
}

// == Rewrite Url Builder ==
/// Builds rewritten links, falling back to plain ones when the deployment or
/// the query string does not allow rewriting.
pub struct RewriteUrlBuilder {
    names: Arc<NameCache>,
    base_script_file: String,
    force_script_name: Option<String>,
    decoder: Arc<dyn HtmlDecode + Send + Sync>,
}

impl RewriteUrlBuilder {
    // == Constructor ==
    pub fn new(names: Arc<NameCache>, base_script_file: impl Into<String>) -> Self {
        Self {
            names,
            base_script_file: base_script_file.into(),
            force_script_name: None,
            decoder: Arc::new(EntityDecoder),
        }
    }

    pub fn from_config(names: Arc<NameCache>, config: &Config) -> Self {
        Self::new(names, config.base_script_file.clone())
            .with_forced_script_name(config.force_script_name.clone())
    }

    /// Uses `name` instead of the request's script name when checking
    /// whether rewriting applies.
    pub fn with_forced_script_name(mut self, name: Option<String>) -> Self {
        self.force_script_name = name;
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn HtmlDecode + Send + Sync>) -> Self {
        self.decoder = decoder;
        self
    }

    // == Try Build Url ==
    /// Builds the link for `query`, failing on malformed numeric parameters
    /// or an unreachable name source.
    pub fn try_build_url(&self, ctx: &RequestContext, query: &str) -> Result<String> {
        let script = self
            .force_script_name
            .as_deref()
            .unwrap_or(ctx.script_name.as_str());
        let script_name = format!("{}{}", ctx.path, script);

        if self.base_script_file.is_empty() || !script_name.ends_with(&self.base_script_file) {
            return Ok(escape_ampersands(&ctx.plain_url(query)));
        }
        let before = &script_name[..script_name.len() - self.base_script_file.len()];

        let mut params = QueryParams::parse(query);
        let route = match self.route(&params)? {
            Some(route) => route,
            None => return Ok(escape_ampersands(&ctx.plain_url(query))),
        };

        let mut url = format!("{}{}{}", before, REWRITE_MARKER, route.token);
        if !route.key.is_empty() {
            url.push_str(params.get(route.key));
        }

        if route.paged && params.contains(PAGE_NUMBER_KEY) {
            let page: i64 = parse_number(&params, PAGE_NUMBER_KEY)?;
            if page != 1 {
                url.push_str(&format!("p{}", page));
            }
            params.remove(PAGE_NUMBER_KEY);
        }

        let slug = slugify_with(self.decoder.as_ref(), &route.description);
        if !slug.is_empty() {
            url.push('_');
            url.push_str(&slug);
        }
        url.push_str(REWRITE_EXTENSION);

        let rest = params.to_query_string(&[PAGE_KIND_KEY, route.key]);
        if rest.is_empty() {
            // Only a bare forum index page collapses to the application path.
            if url.strip_prefix(before) == Some(FORUM_ROOT) {
                url.truncate(before.len());
            }
        } else {
            url.push('?');
            url.push_str(&rest);
        }

        if let Some(anchor) = params.anchor() {
            url.push('#');
            url.push_str(anchor);
        }

        Ok(escape_ampersands(&url))
    }

    /// Classifies the query by page kind. `None` means there is no page kind.
    fn route(&self, params: &QueryParams) -> Result<Option<Route>> {
        let page_kind = params.get(PAGE_KIND_KEY);

        let route = match page_kind {
            "" => return Ok(None),
            "topics" => {
                let forum = parse_id(params, "f")?;
                Route::keyed("topics", "f", self.names.resolve(EntityKind::Forum, forum)?, true)
            }
            "posts" if !params.get("t").is_empty() => {
                let topic = parse_id(params, "t")?;
                Route::keyed("postst", "t", self.names.resolve(EntityKind::Topic, topic)?, true)
            }
            "posts" if !params.get("m").is_empty() => {
                let message = parse_id(params, "m")?;
                Route::keyed("postsm", "m", self.topic_name_for_message(message)?, true)
            }
            "posts" => Route::bare("posts", true),
            // Profile names are left out of links on purpose.
            "profile" => Route::keyed("profile", "u", String::new(), false),
            "forum" if !params.get("c").is_empty() => {
                let category = parse_id(params, "c")?;
                Route::keyed(
                    "forum",
                    "c",
                    self.names.resolve(EntityKind::Category, category)?,
                    false,
                )
            }
            other => Route::bare(other, false),
        };

        Ok(Some(route))
    }

    fn topic_name_for_message(&self, message: u64) -> Result<String> {
        let topic = self.names.resolve(EntityKind::Message, message)?;
        if topic.is_empty() {
            return Ok(String::new());
        }
        let topic: u64 = topic.trim().parse().map_err(|_| {
            UrlError::Source(format!("message {} has non-numeric topic id '{}'", message, topic))
        })?;
        self.names.resolve(EntityKind::Topic, topic)
    }
}

impl UrlBuilder for RewriteUrlBuilder {
    fn build_url(&self, ctx: &RequestContext, query: &str) -> String {
        match self.try_build_url(ctx, query) {
            Ok(url) => url,
            Err(err) => {
                warn!(%err, query, "Rewrite failed, using plain URL");
                escape_ampersands(&ctx.plain_url(query))
            }
        }
    }
}

impl std::fmt::Debug for RewriteUrlBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteUrlBuilder")
            .field("names", &self.names)
            .field("base_script_file", &self.base_script_file)
            .field("force_script_name", &self.force_script_name)
            .finish()
    }
}

// == Parameter Parsing ==
/// Parses a required entity ID.
fn parse_id(params: &QueryParams, key: &str) -> Result<u64> {
    if params.get(key).is_empty() {
        return Err(UrlError::MissingParameter(key.to_string()));
    }
    parse_number(params, key)
}

fn parse_number<T: std::str::FromStr>(params: &QueryParams, key: &str) -> Result<T> {
    let value = params.get(key);
    value.trim().parse().map_err(|_| UrlError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Jitter;
    use crate::source::MemoryNameSource;

    fn source() -> Arc<MemoryNameSource> {
        let source = Arc::new(MemoryNameSource::new());
        source.insert(EntityKind::Forum, 12, "General Discussion");
        source.insert(EntityKind::Topic, 7, "Welcome to the Board!");
        source.insert(EntityKind::Topic, 8, "Q&A");
        source.insert(EntityKind::Message, 40, "7");
        source.insert(EntityKind::Message, 41, "9999");
        source.insert(EntityKind::Category, 2, "Café Talk");
        source.insert(EntityKind::Profile, 5, "Jane Doe");
        source
    }

    fn builder_with(source: Arc<MemoryNameSource>) -> RewriteUrlBuilder {
        let cache = NameCache::new(source, 500).with_jitter(Jitter::seeded(5));
        RewriteUrlBuilder::new(Arc::new(cache), "default.aspx")
    }

    fn builder() -> RewriteUrlBuilder {
        builder_with(source())
    }

    fn ctx() -> RequestContext {
        RequestContext::new("http://localhost", None, "default.aspx")
    }

    #[test]
    fn test_topics_first_page_has_no_page_segment() {
        let url = builder().build_url(&ctx(), "g=topics&f=12&p=1");
        assert_eq!(url, "/yaf_topics12_General-Discussion.aspx");
    }

    #[test]
    fn test_topics_page_segment() {
        let url = builder().build_url(&ctx(), "g=topics&f=12&p=3");
        assert_eq!(url, "/yaf_topics12p3_General-Discussion.aspx");
    }

    #[test]
    fn test_topics_without_page() {
        let url = builder().build_url(&ctx(), "g=topics&f=12");
        assert_eq!(url, "/yaf_topics12_General-Discussion.aspx");
    }

    #[test]
    fn test_posts_by_topic() {
        let url = builder().build_url(&ctx(), "g=posts&t=7&p=2");
        assert_eq!(url, "/yaf_postst7p2_Welcome-to-the-Board.aspx");
    }

    #[test]
    fn test_posts_by_message_uses_topic_name() {
        let url = builder().build_url(&ctx(), "g=posts&m=40#post40");
        assert_eq!(url, "/yaf_postsm40_Welcome-to-the-Board.aspx#post40");
    }

    #[test]
    fn test_posts_message_with_missing_topic_omits_slug() {
        let url = builder().build_url(&ctx(), "g=posts&m=41");
        assert_eq!(url, "/yaf_postsm41.aspx");
    }

    #[test]
    fn test_posts_topic_takes_precedence_over_message() {
        let url = builder().build_url(&ctx(), "g=posts&t=8&m=40");
        assert_eq!(url, "/yaf_postst8_QandA.aspx?m=40");
    }

    #[test]
    fn test_posts_without_ids() {
        let url = builder().build_url(&ctx(), "g=posts&p=2");
        assert_eq!(url, "/yaf_postsp2.aspx");
    }

    #[test]
    fn test_profile_never_has_slug() {
        let url = builder().build_url(&ctx(), "g=profile&u=5");
        assert_eq!(url, "/yaf_profile5.aspx");
    }

    #[test]
    fn test_profile_keeps_page_parameter() {
        let url = builder().build_url(&ctx(), "g=profile&u=5&p=2");
        assert_eq!(url, "/yaf_profile5.aspx?p=2");
    }

    #[test]
    fn test_forum_category() {
        let url = builder().build_url(&ctx(), "g=forum&c=2");
        assert_eq!(url, "/yaf_forum2_Cafe-Talk.aspx");
    }

    #[test]
    fn test_forum_root_collapses() {
        assert_eq!(builder().build_url(&ctx(), "g=forum"), "/");

        let nested = RequestContext::new("http://localhost", Some("/boards/"), "default.aspx");
        assert_eq!(builder().build_url(&nested, "g=forum"), "/boards/");
    }

    #[test]
    fn test_forum_root_with_anchor() {
        assert_eq!(builder().build_url(&ctx(), "g=forum#top"), "/#top");
    }

    #[test]
    fn test_forum_root_with_residual_not_collapsed() {
        let url = builder().build_url(&ctx(), "g=forum&x=1");
        assert_eq!(url, "/yaf_forum.aspx?x=1");
    }

    #[test]
    fn test_residual_value_naming_forum_root_is_kept() {
        let url = builder().build_url(&ctx(), "g=topics&f=12&return=yaf_forum.aspx");
        assert_eq!(
            url,
            "/yaf_topics12_General-Discussion.aspx?return=yaf_forum.aspx"
        );

        let url = builder().build_url(&ctx(), "g=search&next=/yaf_forum.aspx");
        assert_eq!(url, "/yaf_search.aspx?next=/yaf_forum.aspx");
    }

    #[test]
    fn test_unknown_page_kind_passes_parameters_through() {
        let url = builder().build_url(&ctx(), "g=search&q=rust&sort=new");
        assert_eq!(url, "/yaf_search.aspx?q=rust&amp;sort=new");
    }

    #[test]
    fn test_missing_page_kind_is_plain() {
        let url = builder().build_url(&ctx(), "f=12&x=1");
        assert_eq!(url, "/default.aspx?f=12&amp;x=1");
    }

    #[test]
    fn test_residual_parameters_escaped() {
        let url = builder().build_url(&ctx(), "g=topics&f=12&sort=asc&view=all");
        assert_eq!(
            url,
            "/yaf_topics12_General-Discussion.aspx?sort=asc&amp;view=all"
        );
    }

    #[test]
    fn test_unknown_entity_omits_slug() {
        let url = builder().build_url(&ctx(), "g=topics&f=404");
        assert_eq!(url, "/yaf_topics404.aspx");
    }

    #[test]
    fn test_app_root_prefix() {
        let ctx = RequestContext::new("http://localhost", Some("forum"), "default.aspx");
        let url = builder().build_url(&ctx, "g=topics&f=12");
        assert_eq!(url, "/forum/yaf_topics12_General-Discussion.aspx");
    }

    #[test]
    fn test_build_url_full() {
        let ctx = RequestContext::new("https://example.org/", None, "default.aspx");
        let url = builder().build_url_full(&ctx, "g=topics&f=12");
        assert_eq!(url, "https://example.org/yaf_topics12_General-Discussion.aspx");
    }

    #[test]
    fn test_non_standard_script_falls_back() {
        let ctx = RequestContext::new("http://localhost", None, "forum.php");
        let url = builder().build_url(&ctx, "g=topics&f=12");
        assert_eq!(url, "/forum.php?g=topics&amp;f=12");
    }

    #[test]
    fn test_forced_script_name_enables_rewrite() {
        let ctx = RequestContext::new("http://localhost", None, "portal.aspx");
        let builder = builder().with_forced_script_name(Some("default.aspx".to_string()));
        let url = builder.build_url(&ctx, "g=topics&f=12");
        assert_eq!(url, "/yaf_topics12_General-Discussion.aspx");
    }

    #[test]
    fn test_malformed_id_is_error() {
        let result = builder().try_build_url(&ctx(), "g=topics&f=abc");
        assert_eq!(
            result,
            Err(UrlError::InvalidNumber {
                key: "f".to_string(),
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_malformed_page_is_error() {
        let result = builder().try_build_url(&ctx(), "g=topics&f=12&p=two");
        assert!(matches!(result, Err(UrlError::InvalidNumber { .. })));
    }

    #[test]
    fn test_missing_forum_id_is_error() {
        let result = builder().try_build_url(&ctx(), "g=topics");
        assert_eq!(result, Err(UrlError::MissingParameter("f".to_string())));
    }

    #[test]
    fn test_malformed_id_falls_back_to_plain() {
        let url = builder().build_url(&ctx(), "g=topics&f=abc");
        assert_eq!(url, "/default.aspx?g=topics&amp;f=abc");
    }

    #[test]
    fn test_output_idempotent_under_escaping() {
        let url = builder().build_url(&ctx(), "g=search&a=1&amp;b=2");
        assert_eq!(url, "/yaf_search.aspx?a=1&amp;b=2");
        assert_eq!(escape_ampersands(&url), url);
    }

    /// Leaves names untouched so entity text reaches the slug rules as-is.
    struct RawDecoder;

    impl HtmlDecode for RawDecoder {
        fn decode<'a>(&self, input: &'a str) -> std::borrow::Cow<'a, str> {
            std::borrow::Cow::Borrowed(input)
        }
    }

    #[test]
    fn test_custom_decoder_used_for_slug() {
        let source = source();
        source.insert(EntityKind::Forum, 13, "Tips &amp; Tricks");

        let url = builder_with(source.clone()).build_url(&ctx(), "g=topics&f=13");
        assert_eq!(url, "/yaf_topics13_Tips-and-Tricks.aspx");

        let raw = builder_with(source).with_decoder(Arc::new(RawDecoder));
        let url = raw.build_url(&ctx(), "g=topics&f=13");
        assert_eq!(url, "/yaf_topics13_Tips-andamp-Tricks.aspx");
    }

    #[test]
    fn test_names_cached_between_links() {
        let source = source();
        let builder = builder_with(source.clone());
        builder.build_url(&ctx(), "g=topics&f=12");
        builder.build_url(&ctx(), "g=topics&f=12&p=4");
        builder.build_url(&ctx(), "g=posts&t=7");
        builder.build_url(&ctx(), "g=posts&t=8");
        assert_eq!(source.fetch_count(), 2);
    }
}
