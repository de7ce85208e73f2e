//! Asset inlining and HTML sanitation
//!
//! Turns fetched page HTML into a self-contained archival document:
//! - `<script>`, `<noscript>` and comments are removed
//! - `<img>` sources are replaced by base64 data URIs, or the image is
//!   removed when it cannot be fetched
//! - Stylesheets from blocked font hosts are removed
//! - `<input>` types outside the allow-list become `text`
//!
//! The work is split in two: [`build_image_table`] does the network I/O and
//! [`sanitize`] is a pure rewrite that reports what it degraded as
//! [`CleanWarning`]s instead of failing.

mod images;
mod sanitize;

pub use images::{build_image_table, collect_image_sources, to_data_uri, ImageFetch, ImageTable};
pub use sanitize::sanitize;

use crate::config::SanitizeConfig;
use crate::crawler::Fetcher;
use crate::RenderError;
use std::fmt;
use url::Url;

/// Cleaned HTML plus everything that was silently dropped or changed
#[derive(Debug, Clone)]
pub struct CleanedPage {
    /// Self-contained HTML
    pub html: String,
    /// Non-fatal degradations, in document order
    pub warnings: Vec<CleanWarning>,
}

/// A non-fatal change made while cleaning a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanWarning {
    /// Image could not be fetched and was removed
    ImageDropped { src: String, reason: String },
    /// Stylesheet from a blocked host was removed
    StylesheetRemoved { href: String },
    /// Input with an unsupported type was turned into a text input
    InputCoerced { from: String },
}

impl fmt::Display for CleanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageDropped { src, reason } => write!(f, "dropped image {}: {}", src, reason),
            Self::StylesheetRemoved { href } => write!(f, "removed stylesheet {}", href),
            Self::InputCoerced { from } => write!(f, "coerced input type '{}' to text", from),
        }
    }
}

/// Cleans raw page HTML into a self-contained archival document
///
/// Images are fetched one at a time through `fetcher`, resolved against
/// `page_url`. Individual failures only degrade the affected element.
pub async fn clean(
    raw_html: &str,
    page_url: &Url,
    fetcher: &Fetcher,
    options: &SanitizeConfig,
) -> Result<CleanedPage, RenderError> {
    let images = build_image_table(raw_html, page_url, fetcher).await;
    sanitize(raw_html, &images, options)
}
