use crate::UrlError;
use url::Url;

/// Removes a `#fragment` suffix
///
/// Fragments name anchors inside one document, so `page#a` and `page#b` are
/// the same resource.
pub fn strip_fragment(href: &str) -> &str {
    match href.find('#') {
        Some(idx) => &href[..idx],
        None => href,
    }
}

/// Returns true for `mailto:` hrefs, regardless of case
pub fn is_mailto(href: &str) -> bool {
    href.trim_start()
        .get(..7)
        .map(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
        .unwrap_or(false)
}

/// Resolves a possibly-relative href against the page it was found on
///
/// The fragment is stripped first. An href that is empty after stripping
/// resolves to the page itself.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_archiver::url::resolve_href;
///
/// let page = Url::parse("https://example.com/wiki/home").unwrap();
/// let url = resolve_href(&page, "../about#team").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = strip_fragment(href.trim());
    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

/// Parses and normalizes an absolute crawl URL
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require an HTTP(S) scheme
/// 3. Require a host
/// 4. Remove the fragment
///
/// The url crate already lowercases the host and removes dot segments.
/// Query strings and trailing slashes are preserved because the site may
/// serve different pages for them.
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
