//! Capture filtering.
//!
//! Decides whether a copy event reported by a capture client should be
//! recorded at all. Empty copies are dropped, and so are copies made on a
//! page whose host matches a blacklist pattern.
//!
//! Pattern forms:
//!
//! - `example.com` matches that host exactly (or any host containing it)
//! - `*.example.com` matches `example.com` and every subdomain
//! - `bank.*` matches `bank.com`, `bank.co.uk` and so on

use regex::Regex;
use std::sync::LazyLock;

use crate::storage::NewEntry;

static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://(?:[^@/?#]*@)?(\[[^\]]*\]|[^:/?#]+)")
        .expect("valid host pattern")
});

/// Why a capture was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// Nothing but whitespace was copied.
    Empty,
    /// The source host matched this blacklist pattern.
    Blacklisted(String),
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Skip::Empty => write!(f, "empty content"),
            Skip::Blacklisted(pattern) => write!(f, "source matches blacklist pattern '{pattern}'"),
        }
    }
}

/// Returns true if `content` is worth recording.
pub fn should_capture(content: &str) -> bool {
    !content.trim().is_empty()
}

/// Extracts the lowercased host of an absolute URL.
pub fn host_of(url: &str) -> Option<String> {
    let caps = HOST_PATTERN.captures(url.trim())?;
    let host = caps.get(1)?.as_str().to_ascii_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

fn pattern_matches(pattern: &str, host: &str) -> bool {
    if pattern == host {
        return true;
    }

    if let Some(domain) = pattern.strip_prefix("*.") {
        return host == domain || host.ends_with(&format!(".{domain}"));
    }

    if let Some(prefix) = pattern.strip_suffix(".*") {
        return host.starts_with(&format!("{prefix}."));
    }

    host.contains(pattern)
}

/// Returns the first blacklist pattern matching the host of `url`.
///
/// URLs without a recognizable host never match.
pub fn blacklist_match<'a>(url: &str, blacklist: &'a [String]) -> Option<&'a str> {
    if blacklist.is_empty() {
        return None;
    }
    let host = host_of(url)?;
    blacklist
        .iter()
        .map(String::as_str)
        .find(|pattern| pattern_matches(pattern, &host))
}

/// Returns true if the host of `url` matches any blacklist pattern.
pub fn is_blacklisted(url: &str, blacklist: &[String]) -> bool {
    blacklist_match(url, blacklist).is_some()
}

/// Checks a capture request against the empty-content and blacklist rules.
pub fn check(request: &NewEntry, blacklist: &[String]) -> Result<(), Skip> {
    if !should_capture(&request.content) {
        return Err(Skip::Empty);
    }

    if let Some(source) = request.source.as_deref() {
        if let Some(pattern) = blacklist_match(source, blacklist) {
            return Err(Skip::Blacklisted(pattern.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_should_capture() {
        assert!(should_capture("hello"));
        assert!(should_capture("  x  "));
        assert!(!should_capture(""));
        assert!(!should_capture(" \n\t "));
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://Mail.Example.com:8443/inbox?x=1").as_deref(),
            Some("mail.example.com")
        );
        assert_eq!(
            host_of("http://user:pw@example.org/").as_deref(),
            Some("example.org")
        );
        assert_eq!(host_of("file:///etc/passwd"), None);
        assert_eq!(host_of("not a url"), None);
        assert_eq!(host_of(""), None);
    }

    #[test]
    fn test_exact_match() {
        let list = patterns(&["example.com"]);
        assert!(is_blacklisted("https://example.com/page", &list));
    }

    #[test]
    fn test_wildcard_subdomain() {
        let list = patterns(&["*.example.com"]);
        assert!(is_blacklisted("https://example.com", &list));
        assert!(is_blacklisted("https://a.b.example.com", &list));
        assert!(!is_blacklisted("https://notexample.com", &list));
    }

    #[test]
    fn test_wildcard_tld() {
        let list = patterns(&["bank.*"]);
        assert!(is_blacklisted("https://bank.com", &list));
        assert!(is_blacklisted("https://bank.co.uk/login", &list));
        assert!(!is_blacklisted("https://mybank.com", &list));
    }

    #[test]
    fn test_partial_match() {
        let list = patterns(&["paypal"]);
        assert!(is_blacklisted("https://www.paypal.com", &list));
        assert!(!is_blacklisted("https://example.com", &list));
    }

    #[test]
    fn test_empty_list_and_bad_url() {
        assert!(!is_blacklisted("https://example.com", &[]));
        assert!(!is_blacklisted("garbage", &patterns(&["garbage"])));
    }

    #[test]
    fn test_check_request() {
        let list = patterns(&["*.secret.io"]);

        assert_eq!(check(&NewEntry::text("   "), &list), Err(Skip::Empty));

        let blocked = NewEntry {
            source: Some("https://vault.secret.io/x".to_string()),
            ..NewEntry::text("token")
        };
        assert_eq!(
            check(&blocked, &list),
            Err(Skip::Blacklisted("*.secret.io".to_string()))
        );

        let allowed = NewEntry {
            source: Some("https://docs.rs".to_string()),
            ..NewEntry::text("token")
        };
        assert_eq!(check(&allowed, &list), Ok(()));
        assert_eq!(check(&NewEntry::text("no source"), &list), Ok(()));
    }
}
