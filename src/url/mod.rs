//! URL handling module for Wiki-Archiver
//!
//! This module provides link resolution, fragment stripping, host extraction,
//! internal/external classification, and deterministic archive file naming.

mod domain;
mod naming;
mod normalize;

use serde::Deserialize;
use url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use naming::{archive_file_name, slugify_path, url_digest};
pub use normalize::{is_mailto, normalize_url, resolve_href, strip_fragment};

/// How a candidate host is compared against the crawl root's host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMatch {
    /// Host must equal the root host
    #[default]
    Exact,
    /// Host must end with the root host
    Suffix,
}

impl HostMatch {
    /// Returns true if `candidate` is in scope for `root`
    pub fn matches(&self, root: &str, candidate: &str) -> bool {
        match self {
            Self::Exact => candidate == root,
            Self::Suffix => candidate.ends_with(root),
        }
    }
}

/// Decides whether a URL is internal to the crawl root
///
/// A candidate without a host (a path-relative or path-absolute reference)
/// is always internal. Otherwise its host is compared with the root's host
/// using `host_match`.
///
/// # Examples
///
/// ```
/// use wiki_archiver::url::{is_internal, HostMatch};
///
/// let root = "https://example.com/wiki/home";
/// assert!(is_internal("/relative/path", root, HostMatch::Exact));
/// assert!(is_internal("https://example.com/other", root, HostMatch::Exact));
/// assert!(!is_internal("https://other.example.com/x", root, HostMatch::Exact));
/// ```
pub fn is_internal(candidate: &str, root: &str, host_match: HostMatch) -> bool {
    let root_host = Url::parse(root).ok().as_ref().and_then(extract_domain);
    host_is_internal(candidate, root_host.as_deref(), host_match)
}

fn host_is_internal(candidate: &str, root_host: Option<&str>, host_match: HostMatch) -> bool {
    let candidate_host = match Url::parse(candidate) {
        Ok(url) => extract_domain(&url),
        // Relative references carry no host of their own
        Err(_) => None,
    };

    match (candidate_host, root_host) {
        (None, _) => true,
        (Some(host), Some(root)) => host_match.matches(root, &host),
        (Some(_), None) => false,
    }
}

/// Link scope bound to one crawl root
///
/// Parses the root once so the crawl loop can classify every discovered
/// link without re-parsing it.
#[derive(Debug, Clone)]
pub struct LinkScope {
    root: Url,
    root_host: Option<String>,
    host_match: HostMatch,
}

impl LinkScope {
    /// Creates a scope for the given root URL
    pub fn new(root: &str, host_match: HostMatch) -> crate::UrlResult<Self> {
        let root = normalize_url(root)?;
        let root_host = extract_domain(&root);
        Ok(Self {
            root,
            root_host,
            host_match,
        })
    }

    /// The normalized root URL
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Returns true if `candidate` belongs to the crawled site
    pub fn is_internal(&self, candidate: &str) -> bool {
        host_is_internal(candidate, self.root_host.as_deref(), self.host_match)
    }

    /// Resolves an anchor href found on `page` and keeps it only if it should be crawled
    ///
    /// Returns None for `mailto:` links, unresolvable hrefs, non-HTTP(S)
    /// results, and external hosts.
    pub fn follow(&self, page: &Url, href: &str) -> Option<Url> {
        if is_mailto(href) {
            return None;
        }

        let resolved = resolve_href(page, href)?;
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            return None;
        }

        self.is_internal(resolved.as_str()).then_some(resolved)
    }
}
