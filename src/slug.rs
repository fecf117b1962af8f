//! Slug Module
//!
//! Turns display names into ASCII, URL-safe suffixes for rewritten links.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;

// == Html Decode ==
/// Decodes HTML character references in stored display names.
pub trait HtmlDecode {
    fn decode<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

/// Decoder for named and numeric HTML entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityDecoder;

impl HtmlDecode for EntityDecoder {
    fn decode<'a>(&self, input: &'a str) -> Cow<'a, str> {
        html_escape::decode_html_entities(input)
    }
}

// == Slugify ==
/// Builds a slug from a display name using the default entity decoder.
///
/// ```
/// assert_eq!(forum_urls::slug::slugify("Café & Crème"), "Cafe-and-Creme");
/// ```
pub fn slugify(name: &str) -> String {
    slugify_with(&EntityDecoder, name)
}

/// Builds a slug from a display name.
///
/// Whitespace and `.` become `-`, accents are stripped through canonical
/// decomposition, `&` is spelled out as `and`, and everything that is not
/// an ASCII letter, digit or `-` is dropped. Case is preserved. The result
/// may be empty.
pub fn slugify_with<D: HtmlDecode + ?Sized>(decoder: &D, name: &str) -> String {
    let decoded = decoder.decode(name.trim());
    let spelled = decoded.replace('&', "and");

    let mut slug = String::with_capacity(spelled.len());
    for c in spelled.nfd() {
        if c.is_whitespace() || c == '.' || c == '-' {
            slug.push('-');
        } else if c.is_ascii_alphanumeric() {
            slug.push(c);
        }
    }
    slug
}
