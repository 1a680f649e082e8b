//! Content classification.
//!
//! Captured content is tagged as a URL when the whole trimmed string is a
//! single `http://`, `https://` or `www.` link, and as text otherwise.

use regex::Regex;
use std::sync::LazyLock;

use crate::storage::EntryType;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://|www\.)\S+$").expect("valid url pattern")
});

/// Classifies captured content.
pub fn classify(content: &str) -> EntryType {
    if URL_PATTERN.is_match(content.trim()) {
        EntryType::Url
    } else {
        EntryType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_urls() {
        assert_eq!(classify("https://example.com/path?q=1"), EntryType::Url);
        assert_eq!(classify("http://localhost:8080"), EntryType::Url);
        assert_eq!(classify("www.rust-lang.org"), EntryType::Url);
        assert_eq!(classify("HTTPS://EXAMPLE.COM"), EntryType::Url);
    }

    #[test]
    fn test_classify_trims_surrounding_whitespace() {
        assert_eq!(classify("  https://example.com\n"), EntryType::Url);
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify("hello world"), EntryType::Text);
        assert_eq!(classify("see https://example.com"), EntryType::Text);
        assert_eq!(classify("ftp://example.com"), EntryType::Text);
        assert_eq!(classify(""), EntryType::Text);
    }

    #[test]
    fn test_classify_rejects_embedded_whitespace() {
        assert_eq!(classify("https://example.com and more"), EntryType::Text);
        assert_eq!(classify("https://a.com\nhttps://b.com"), EntryType::Text);
    }

    #[test]
    fn test_classify_bare_scheme_is_text() {
        assert_eq!(classify("https://"), EntryType::Text);
        assert_eq!(classify("www."), EntryType::Text);
    }
}
