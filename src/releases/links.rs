//! Release link recognition and share-link rewriting

use crate::config::ReleaseConfig;
use crate::url::{resolve_href, strip_fragment};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Query parameter carrying the file id on share links
const ID_PARAM: &str = "id";

/// File id embedded in a share path, `/file/d/<id>/view`
static SHARE_PATH_ID: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)").ok());

/// Resolves an anchor href on the release index into a download URL
///
/// - An href ending with the release extension (case-insensitive) is resolved
///   against the index URL.
/// - An href mentioning the share host is rewritten to the direct-download
///   endpoint when a file id can be found in it; otherwise the href is
///   used as written.
/// - Anything else is not a release link.
///
/// # Example
///
/// ```
/// use wiki_archiver::config::ReleaseConfig;
/// use wiki_archiver::releases::resolve_release_link;
/// use url::Url;
///
/// let index = Url::parse("https://docs.example.com/build-history").unwrap();
/// let config = ReleaseConfig::default();
///
/// let direct = resolve_release_link(&index, "notes/v2.PDF", &config).unwrap();
/// assert_eq!(direct.as_str(), "https://docs.example.com/notes/v2.PDF");
///
/// let shared = resolve_release_link(
///     &index,
///     "https://drive.google.com/file/d/abc_123/view",
///     &config,
/// )
/// .unwrap();
/// assert_eq!(
///     shared.as_str(),
///     "https://drive.google.com/uc?export=download&id=abc_123"
/// );
///
/// assert!(resolve_release_link(&index, "/wiki/home", &config).is_none());
/// ```
pub fn resolve_release_link(index_url: &Url, href: &str, config: &ReleaseConfig) -> Option<Url> {
    let href = href.trim();
    let extension = config.extension.to_ascii_lowercase();

    if strip_fragment(href).to_ascii_lowercase().ends_with(&extension) {
        return resolve_href(index_url, href);
    }

    if href.contains(config.share_host.as_str()) {
        return match share_file_id(href) {
            Some(id) => direct_download_url(&config.share_download_url, &id),
            None => Url::parse(href).ok().or_else(|| resolve_href(index_url, href)),
        };
    }

    None
}

/// Extracts the file id of a share link from `/d/<id>` or `?id=<id>`
pub fn share_file_id(href: &str) -> Option<String> {
    let path_id = SHARE_PATH_ID
        .as_ref()?
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    if path_id.is_some() {
        return path_id;
    }

    Url::parse(href).ok().and_then(|url| {
        url.query_pairs()
            .find(|(key, _)| key == ID_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    })
}

fn direct_download_url(endpoint: &str, id: &str) -> Option<Url> {
    let mut url = Url::parse(endpoint).ok()?;
    url.query_pairs_mut().append_pair(ID_PARAM, id);
    Some(url)
}
