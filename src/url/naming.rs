use sha2::{Digest, Sha256};
use url::Url;

/// Number of hex characters of the URL digest kept in file names
const DIGEST_LEN: usize = 8;

/// Builds the archive file name for a URL
///
/// The name is `<slug>_<hash8>.<ext>`: `slug` is the URL path with runs of
/// non-alphanumeric characters collapsed to `_`, and `hash8` is the first
/// eight hex characters of the SHA-256 of the full URL, which keeps two URLs
/// with equal slugs apart. The mapping is pure, so a re-run finds the files
/// of the previous run.
///
/// # Examples
///
/// ```
/// use wiki_archiver::url::archive_file_name;
///
/// let name = archive_file_name("https://example.com/wiki/getting-started", "pdf");
/// assert!(name.starts_with("wiki_getting_started_"));
/// assert!(name.ends_with(".pdf"));
/// ```
pub fn archive_file_name(url: &str, ext: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };
    format!("{}_{}.{}", slugify_path(&path), url_digest(url), ext)
}

/// Collapses a URL path into a file-name-safe slug
///
/// Leading and trailing slashes are ignored. An empty path becomes `page`.
pub fn slugify_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    let mut slug = String::with_capacity(trimmed.len());
    let mut in_gap = false;

    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }

    if slug.is_empty() {
        "page".to_string()
    } else {
        slug
    }
}

/// First eight hex characters of the SHA-256 of the URL
pub fn url_digest(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(DIGEST_LEN);
    hex
}
