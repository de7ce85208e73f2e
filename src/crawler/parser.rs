//! HTML parser for extracting links and metadata
//!
//! This module handles parsing page HTML to extract:
//! - Anchor hrefs to follow, in document order
//! - Page title

use crate::url::LinkScope;
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Internal links found on the page, absolute and fragment-free,
    /// in document order
    pub links: Vec<Url>,
}

/// Parses page HTML and extracts the internal links to follow
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `mailto:` links
/// - Links that resolve outside the crawl scope
/// - Non-HTTP(S) results (`javascript:`, `tel:`, `data:`)
///
/// Duplicates are kept; the visited set takes care of them.
///
/// # Example
///
/// ```
/// use wiki_archiver::crawler::parse_html;
/// use wiki_archiver::url::{HostMatch, LinkScope};
/// use url::Url;
///
/// let scope = LinkScope::new("https://example.com/", HostMatch::Exact).unwrap();
/// let page = Url::parse("https://example.com/wiki").unwrap();
/// let html = r#"<title>Wiki</title><a href="/guide#top">Guide</a><a href="https://other.com/">x</a>"#;
///
/// let parsed = parse_html(html, &page, &scope);
/// assert_eq!(parsed.title.as_deref(), Some("Wiki"));
/// assert_eq!(parsed.links.len(), 1);
/// assert_eq!(parsed.links[0].as_str(), "https://example.com/guide");
/// ```
pub fn parse_html(html: &str, page_url: &Url, scope: &LinkScope) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let links = extract_hrefs(&document)
        .into_iter()
        .filter_map(|href| scope.follow(page_url, &href))
        .collect();

    ParsedPage { title, links }
}

/// Extracts the page title
pub fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects every anchor href in document order
pub fn extract_hrefs(document: &Html) -> Vec<String> {
    let mut hrefs = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                hrefs.push(href.to_string());
            }
        }
    }

    hrefs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::HostMatch;

    fn scope() -> LinkScope {
        LinkScope::new("https://example.com/wiki/home", HostMatch::Exact).unwrap()
    }

    fn page_url() -> Url {
        Url::parse("https://example.com/wiki/page").unwrap()
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        let parsed = parse_html(html, &page_url(), &scope());
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        let parsed = parse_html(html, &page_url(), &scope());
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        let parsed = parse_html(html, &page_url(), &scope());
        assert_eq!(parsed.links.len(), 1);
        assert_eq!(parsed.links[0].as_str(), "https://example.com/wiki/other");
    }

    #[test]
    fn test_skip_external_link() {
        let html = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let parsed = parse_html(html, &page_url(), &scope());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_skip_mailto_link() {
        let html = r#"<html><body><a href="mailto:test@example.com">Email</a></body></html>"#;
        let parsed = parse_html(html, &page_url(), &scope());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_fragment_stripped() {
        let html = r##"<html><body><a href="/wiki/guide#install">Install</a></body></html>"##;
        let parsed = parse_html(html, &page_url(), &scope());
        assert_eq!(parsed.links[0].as_str(), "https://example.com/wiki/guide");
    }

    #[test]
    fn test_links_in_document_order() {
        let html = r#"
            <html>
            <body>
                <nav><a href="/c">C</a></nav>
                <a href="/a">A</a>
                <a href="https://other.com/x">X</a>
                <a href="/b">B</a>
            </body>
            </html>
        "#;
        let parsed = parse_html(html, &page_url(), &scope());
        let links: Vec<&str> = parsed.links.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/c",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
    }
}
