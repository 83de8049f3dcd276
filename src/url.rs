//! URL normalization and domain extraction
//!
//! Every URL that reaches the frontier passes through here first. The
//! normalization rules are deliberately minimal: resolve against the page
//! that linked it, strip the fragment, and accept only absolute http(s)
//! addresses. Two URLs differing only by fragment are the same frontier
//! entry.

use crate::UrlError;
use url::Url;

/// Normalizes a seed URL given as a plain string.
///
/// Seeds must already be absolute; there is no base to resolve against.
/// The fragment is stripped so seeds dedup against discovered links.
pub fn normalize_seed(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Resolves a discovered href against its page and validates it.
///
/// Returns `None` for anything the crawler must never enqueue:
/// - `javascript:`, `mailto:`, `tel:`, `data:` schemes
/// - fragment-only links (same-page anchors)
/// - hrefs that do not resolve to an absolute http(s) URL
pub fn normalize_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    // Fragment-only links point back at the same page
    if href.starts_with('#') {
        return None;
    }

    match base.join(href) {
        Ok(mut absolute) => {
            if absolute.scheme() != "http" && absolute.scheme() != "https" {
                return None;
            }
            absolute.set_fragment(None);
            Some(absolute)
        }
        Err(_) => None,
    }
}

/// Extracts the domain (lowercased host) from a URL.
///
/// The domain is the unit of politeness state; lowercasing makes lookups
/// case-insensitive. Hosts with ports keep the port, since a mock server on
/// `127.0.0.1:PORT` is a distinct politeness domain from another port.
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/jobs/page").unwrap()
    }

    #[test]
    fn test_seed_strips_fragment() {
        let url = normalize_seed("https://example.com/page#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_seed_rejects_ftp() {
        let result = normalize_seed("ftp://example.com/file");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_seed_rejects_garbage() {
        assert!(normalize_seed("not a url").is_err());
    }

    #[test]
    fn test_resolve_relative() {
        let url = normalize_url(&base(), "/other").unwrap();
        assert_eq!(url.as_str(), "https://example.com/other");
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = normalize_url(&base(), "detail").unwrap();
        assert_eq!(url.as_str(), "https://example.com/jobs/detail");
    }

    #[test]
    fn test_resolve_absolute() {
        let url = normalize_url(&base(), "https://other.com/x").unwrap();
        assert_eq!(url.as_str(), "https://other.com/x");
    }

    #[test]
    fn test_fragment_stripped_on_resolution() {
        let url = normalize_url(&base(), "/page#top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_skip_javascript() {
        assert!(normalize_url(&base(), "javascript:void(0)").is_none());
    }

    #[test]
    fn test_skip_mailto() {
        assert!(normalize_url(&base(), "mailto:jobs@example.com").is_none());
    }

    #[test]
    fn test_skip_tel_and_data() {
        assert!(normalize_url(&base(), "tel:+123456").is_none());
        assert!(normalize_url(&base(), "data:text/html,<p>x</p>").is_none());
    }

    #[test]
    fn test_skip_fragment_only() {
        assert!(normalize_url(&base(), "#apply").is_none());
    }

    #[test]
    fn test_skip_empty() {
        assert!(normalize_url(&base(), "  ").is_none());
    }

    #[test]
    fn test_skip_non_http_after_resolution() {
        assert!(normalize_url(&base(), "ftp://example.com/x").is_none());
    }

    #[test]
    fn test_extract_domain_lowercases() {
        let url = Url::parse("https://EXAMPLE.com/page").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_domain_keeps_port() {
        let url = Url::parse("http://127.0.0.1:8080/page").unwrap();
        assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
    }

    #[test]
    fn test_same_url_different_fragment_collapse() {
        let a = normalize_url(&base(), "/page#a").unwrap();
        let b = normalize_url(&base(), "/page#b").unwrap();
        assert_eq!(a, b);
    }
}
