//! Query Parameter Module
//!
//! Ordered query-string parameters with an optional anchor, parsed leniently
//! and rebuilt selectively once the rewriter has consumed some of them.

// == Query Params ==
/// Ordered key/value pairs of a query string plus its `#anchor`.
///
/// Repeated keys are kept in order; lookups resolve to the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
    anchor: Option<String>,
}

impl QueryParams {
    // == Parse ==
    /// Parses a raw query string such as `g=posts&t=5&p=2#post12`.
    ///
    /// A leading `?` is ignored and `&amp;` separators are accepted. Segments
    /// without `=` or with an empty key are dropped. Values are kept exactly
    /// as they appear so rebuilding never re-encodes them.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_start_matches('?');

        let (body, anchor) = match raw.split_once('#') {
            Some((body, anchor)) if !anchor.is_empty() => (body, Some(anchor.to_string())),
            Some((body, _)) => (body, None),
            None => (raw, None),
        };

        let body = body.replace("&amp;", "&");
        let pairs = body
            .split('&')
            .filter_map(|segment| {
                let (key, value) = segment.split_once('=')?;
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), value.to_string()))
            })
            .collect();

        Self { pairs, anchor }
    }

    // == Get ==
    /// Returns the value for `key`, or an empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Returns true if `key` occurs at least once, even with an empty value.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    // == Remove ==
    /// Removes every occurrence of `key`.
    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    // == To Query String ==
    /// Rebuilds `k=v&k2=v2` in input order, skipping the excluded keys.
    ///
    /// Returns an empty string when nothing remains. Empty entries in
    /// `exclude` are ignored.
    pub fn to_query_string(&self, exclude: &[&str]) -> String {
        self.pairs
            .iter()
            .filter(|(k, _)| !exclude.iter().any(|ex| !ex.is_empty() && ex == k))
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    // == Anchor ==
    pub fn has_anchor(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let params = QueryParams::parse("g=topics&f=12&p=3");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get("g"), "topics");
        assert_eq!(params.get("f"), "12");
        assert_eq!(params.get("p"), "3");
        assert!(!params.has_anchor());
    }

    #[test]
    fn test_parse_anchor() {
        let params = QueryParams::parse("g=posts&m=40#post40");
        assert_eq!(params.get("m"), "40");
        assert!(params.has_anchor());
        assert_eq!(params.anchor(), Some("post40"));
    }

    #[test]
    fn test_parse_empty_anchor_is_absent() {
        let params = QueryParams::parse("g=forum#");
        assert!(!params.has_anchor());
        assert_eq!(params.get("g"), "forum");
    }

    #[test]
    fn test_parse_drops_malformed_segments() {
        let params = QueryParams::parse("?g=topics&&junk&=5&f=1");
        assert_eq!(params.len(), 2);
        assert_eq!(params.to_query_string(&[]), "g=topics&f=1");
    }

    #[test]
    fn test_parse_encoded_ampersands() {
        let params = QueryParams::parse("g=topics&amp;f=12");
        assert_eq!(params.get("f"), "12");
    }

    #[test]
    fn test_parse_empty_input() {
        let params = QueryParams::parse("");
        assert!(params.is_empty());
        assert_eq!(params.to_query_string(&[]), "");
    }

    #[test]
    fn test_get_missing_is_empty() {
        let params = QueryParams::parse("g=topics");
        assert_eq!(params.get("f"), "");
        assert!(!params.contains("f"));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let params = QueryParams::parse("f=1&f=2&g=topics");
        assert_eq!(params.get("f"), "2");
        assert_eq!(params.to_query_string(&["g"]), "f=1&f=2");
    }

    #[test]
    fn test_remove_all_occurrences() {
        let mut params = QueryParams::parse("p=1&g=topics&p=2");
        params.remove("p");
        assert!(!params.contains("p"));
        assert_eq!(params.to_query_string(&[]), "g=topics");
    }

    #[test]
    fn test_to_query_string_preserves_order_and_excludes() {
        let params = QueryParams::parse("g=posts&t=5&find=unread&sort=desc");
        assert_eq!(params.to_query_string(&["g", "t"]), "find=unread&sort=desc");
        assert_eq!(params.to_query_string(&["g", "t", "find", "sort"]), "");
    }

    #[test]
    fn test_to_query_string_ignores_empty_exclude() {
        let params = QueryParams::parse("g=search&x=1");
        assert_eq!(params.to_query_string(&["g", ""]), "x=1");
    }

    #[test]
    fn test_values_kept_raw() {
        let params = QueryParams::parse("q=hello%20world&g=search");
        assert_eq!(params.get("q"), "hello%20world");
        assert_eq!(params.to_query_string(&["g"]), "q=hello%20world");
    }
}
