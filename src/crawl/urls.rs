// src/crawl/urls.rs
// =============================================================================
// URL normalization, scoping and link resolution.
//
// Two URLs that normalize to the same string are the same crawl target, so
// everything the crawler stores (visited set, results) uses normalized URLs.
//
// Normalization:
// - parse the string (add "https://" when there is no scheme)
// - drop the "#fragment"
// - let the url crate serialize it (lowercase host, default port removed...)
//
// Rust concepts:
// - Result<T, E>: normalize() reports unparsable input as UrlError
// - Option<T>: resolve_link() returns None for links we never follow
// =============================================================================

use url::{ParseError, Url};

use crate::error::UrlError;

// Prefixes of href values that never point to a crawlable page
const SKIPPED_PREFIXES: [&str; 4] = ["javascript:", "mailto:", "tel:", "#"];

// Canonicalizes a URL string
//
// Examples:
//   "https://example.com/a#top" -> "https://example.com/a"
//   "example.com/docs"          -> "https://example.com/docs"
//   "//example.com"             -> "https://example.com/"
//
// normalize(normalize(u)) == normalize(u) for every u that normalizes.
pub fn normalize(raw: &str) -> Result<String, UrlError> {
    let mut url = parse_with_default_scheme(raw)?;
    url.set_fragment(None);
    Ok(url.to_string())
}

fn parse_with_default_scheme(raw: &str) -> Result<Url, UrlError> {
    let invalid = |source| UrlError::Invalid {
        url: raw.to_string(),
        source,
    };

    match Url::parse(raw) {
        Ok(url) => Ok(url),
        // No scheme: "example.com/x" or protocol-relative "//example.com/x"
        Err(ParseError::RelativeUrlWithoutBase) => {
            let without_slashes = raw.trim().trim_start_matches("//");
            Url::parse(&format!("https://{}", without_slashes)).map_err(invalid)
        }
        Err(e) => Err(invalid(e)),
    }
}

// Checks whether a URL lives on the same host as the crawl target
//
// Only the host (and an explicit non-default port) is compared; scheme and
// path are ignored. Anything that fails to parse is out of scope.
pub fn is_in_scope(candidate: &str, target: &str) -> bool {
    let (candidate, target) = match (
        parse_with_default_scheme(candidate),
        parse_with_default_scheme(target),
    ) {
        (Ok(c), Ok(t)) => (c, t),
        _ => return false,
    };

    match (candidate.host_str(), target.host_str()) {
        (Some(c), Some(t)) => c == t && candidate.port() == target.port(),
        _ => false,
    }
}

// Resolves an href found on `base_url` into an absolute, fragment-free URL
//
// Returns None for:
// - empty hrefs
// - javascript:, mailto:, tel: links
// - in-page anchors ("#section")
// - anything the url crate can't parse or join
pub fn resolve_link(base_url: &str, href: &str) -> Option<String> {
    if href.is_empty() || SKIPPED_PREFIXES.iter().any(|p| href.starts_with(p)) {
        return None;
    }

    let base = Url::parse(base_url).ok()?;
    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_fragment() {
        assert_eq!(
            normalize("https://example.com/page#section").unwrap(),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_normalize_adds_https_scheme() {
        assert_eq!(normalize("example.com/docs").unwrap(), "https://example.com/docs");
        assert_eq!(normalize("//example.com").unwrap(), "https://example.com/");
    }

    #[test]
    fn test_normalize_keeps_existing_scheme_and_query() {
        assert_eq!(
            normalize("http://Example.com/a?b=1#c").unwrap(),
            "http://example.com/a?b=1"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize("").is_err());
        assert!(normalize("http://").is_err());
        assert!(normalize("https://exa mple.com").is_err());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://example.com",
            "https://example.com/a/../b/./c#frag",
            "example.com/path?q=1",
            "//cdn.example.com/x.html",
            "HTTP://EXAMPLE.COM:80/Index.html",
            "https://example.com:8443/a%20b",
            "https://例え.jp/パス",
        ];
        for input in inputs {
            let once = normalize(input).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "normalize not idempotent for {input}");
        }
    }

    #[test]
    fn test_in_scope_same_host() {
        assert!(is_in_scope("https://example.com/a/b", "https://example.com/"));
        assert!(is_in_scope("http://example.com/", "https://example.com/"));
        assert!(is_in_scope("example.com/x", "https://example.com"));
    }

    #[test]
    fn test_out_of_scope_other_host() {
        assert!(!is_in_scope("https://other.com/x", "https://example.com/"));
        assert!(!is_in_scope("https://sub.example.com/", "https://example.com/"));
        assert!(!is_in_scope("https://example.com:8080/", "https://example.com/"));
    }

    #[test]
    fn test_scope_parse_failure_is_false() {
        assert!(!is_in_scope("http://", "https://example.com/"));
        assert!(!is_in_scope("https://example.com/", ""));
    }

    #[test]
    fn test_resolve_absolute_link() {
        let result = resolve_link("https://example.com/page", "https://other.com");
        assert_eq!(result, Some("https://other.com/".to_string()));
    }

    #[test]
    fn test_resolve_relative_link() {
        assert_eq!(
            resolve_link("https://example.com/page", "/docs"),
            Some("https://example.com/docs".to_string())
        );
        assert_eq!(
            resolve_link("https://example.com/blog/post", "../about#team"),
            Some("https://example.com/about".to_string())
        );
    }

    #[test]
    fn test_skip_anchor_and_special_schemes() {
        let base = "https://example.com/page";
        assert_eq!(resolve_link(base, "#section"), None);
        assert_eq!(resolve_link(base, ""), None);
        assert_eq!(resolve_link(base, "mailto:test@example.com"), None);
        assert_eq!(resolve_link(base, "tel:+123456"), None);
        assert_eq!(resolve_link(base, "javascript:void(0)"), None);
    }

    #[test]
    fn test_resolve_with_bad_base() {
        assert_eq!(resolve_link("not a url", "/docs"), None);
    }
}
