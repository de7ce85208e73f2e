use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased. URLs without a host (`mailto:`, `data:`) yield None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_archiver::url::extract_domain;
///
/// let url = Url::parse("https://Sites.Google.com/a/wiki").unwrap();
/// assert_eq!(extract_domain(&url), Some("sites.google.com".to_string()));
///
/// let url = Url::parse("mailto:team@example.com").unwrap();
/// assert_eq!(extract_domain(&url), None);
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
