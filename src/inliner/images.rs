use crate::crawler::Fetcher;
use crate::url::resolve_href;
use base64::{engine::general_purpose::STANDARD, Engine};
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Content type used when an image response does not declare one
const FALLBACK_IMAGE_TYPE: &str = "image/png";

/// Result of fetching one image source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFetch {
    /// The source was fetched and encoded as a data URI
    Inlined(String),
    /// The source could not be fetched; the element must be dropped
    Failed(String),
}

/// Image sources as written in the page, mapped to their fetch outcome
pub type ImageTable = HashMap<String, ImageFetch>;

/// Collects every `img[src]` value that is not already a data URI
///
/// Duplicates are removed; first-seen order is kept.
pub fn collect_image_sources(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    if let Ok(selector) = Selector::parse("img[src]") {
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                if is_data_uri(src) || !seen.insert(src.to_string()) {
                    continue;
                }
                sources.push(src.to_string());
            }
        }
    }

    sources
}

/// Fetches every image referenced by the page
///
/// Each distinct source is fetched once. Failures are recorded in the table,
/// never returned.
pub async fn build_image_table(html: &str, page_url: &Url, fetcher: &Fetcher) -> ImageTable {
    let sources = collect_image_sources(html);
    let mut table = ImageTable::with_capacity(sources.len());

    for src in sources {
        let outcome = fetch_image(&src, page_url, fetcher).await;
        if let ImageFetch::Failed(reason) = &outcome {
            tracing::debug!("Image {} on {} not inlined: {}", src, page_url, reason);
        }
        table.insert(src, outcome);
    }

    table
}

async fn fetch_image(src: &str, page_url: &Url, fetcher: &Fetcher) -> ImageFetch {
    let Some(image_url) = resolve_href(page_url, src) else {
        return ImageFetch::Failed("unresolvable image URL".to_string());
    };

    match fetcher.get_bytes(image_url.as_str()).await {
        Ok(resource) => {
            let content_type = resource
                .content_type
                .as_deref()
                .unwrap_or(FALLBACK_IMAGE_TYPE);
            ImageFetch::Inlined(to_data_uri(content_type, &resource.body))
        }
        Err(e) => ImageFetch::Failed(e.to_string()),
    }
}

/// Encodes bytes as a base64 data URI
///
/// # Example
///
/// ```
/// use wiki_archiver::inliner::to_data_uri;
///
/// assert_eq!(to_data_uri("image/gif", b"GIF89a"), "data:image/gif;base64,R0lGODlh");
/// ```
pub fn to_data_uri(content_type: &str, body: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(body))
}

pub(crate) fn is_data_uri(src: &str) -> bool {
    src.trim_start()
        .get(..5)
        .map(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .unwrap_or(false)
}
