use crate::archive::ArchiveFormat;
use crate::url::HostMatch;
use serde::Deserialize;
use std::path::PathBuf;

/// Default crawl root
pub const DEFAULT_ROOT_URL: &str =
    "https://sites.google.com/a/cabinetsensesoftware.com/cabinetsense-wiki/home";

/// Default release-notes index page
pub const DEFAULT_RELEASE_INDEX_URL: &str =
    "https://sites.google.com/a/cabinetsensesoftware.com/cabinetsense-wiki/build-history";

/// Default knowledge directory
pub const DEFAULT_KNOWLEDGE_DIR: &str = "cabinetsense-knowledgebase";

/// Main configuration structure for Wiki-Archiver
///
/// Every section is optional; a missing file or section yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub output: OutputConfig,
    pub http: HttpConfig,
    pub crawl: CrawlConfig,
    pub sanitize: SanitizeConfig,
    pub releases: ReleaseConfig,
    pub render: RenderConfig,
}

/// Which site to archive
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root page the depth-first crawl starts from
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Index page holding release-note links
    #[serde(rename = "release-index-url")]
    pub release_index_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            release_index_url: DEFAULT_RELEASE_INDEX_URL.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the knowledge archive; `pages/` and `releases/` live below it
    #[serde(rename = "knowledge-dir")]
    pub knowledge_dir: PathBuf,

    /// Archival format for crawled pages
    pub format: ArchiveFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            knowledge_dir: PathBuf::from(DEFAULT_KNOWLEDGE_DIR),
            format: ArchiveFormat::Pdf,
        }
    }
}

impl OutputConfig {
    /// Directory receiving archived pages
    pub fn pages_dir(&self) -> PathBuf {
        self.knowledge_dir.join("pages")
    }

    /// Directory receiving harvested release binaries
    pub fn releases_dir(&self) -> PathBuf {
        self.knowledge_dir.join("releases")
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Value sent in the User-Agent header
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for page and image requests (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Per-read timeout for streamed release downloads (seconds)
    ///
    /// Bounds the wait for the response headers and for each body chunk, not
    /// the whole transfer.
    #[serde(rename = "download-timeout-secs")]
    pub download_timeout_secs: u64,

    /// Extra PEM root certificate trusted alongside the bundled roots
    #[serde(rename = "ca-bundle")]
    pub ca_bundle: Option<PathBuf>,

    /// Refuse plain-HTTP requests
    #[serde(rename = "https-only")]
    pub https_only: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "cabinetsense-wiki-scraper/1.0".to_string(),
            timeout_secs: 30,
            download_timeout_secs: 60,
            ca_bundle: None,
            https_only: true,
        }
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// How a link's host is compared with the root host
    #[serde(rename = "host-match")]
    pub host_match: HostMatch,

    /// Fetch already-archived pages to discover their links
    ///
    /// Off by default: a page whose archive exists is neither fetched nor
    /// expanded, so a re-run only requests pages that are new.
    #[serde(rename = "descend-into-archived")]
    pub descend_into_archived: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            host_match: HostMatch::Exact,
            descend_into_archived: false,
        }
    }
}

/// HTML sanitation rules applied before archiving
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SanitizeConfig {
    /// Stylesheet hosts removed from archived pages
    #[serde(rename = "blocked-stylesheet-hosts")]
    pub blocked_stylesheet_hosts: Vec<String>,

    /// Input types kept as-is; everything else becomes `text`
    #[serde(rename = "allowed-input-types")]
    pub allowed_input_types: Vec<String>,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        Self {
            blocked_stylesheet_hosts: vec![
                "fonts.googleapis.com".to_string(),
                "gstatic.com".to_string(),
            ],
            allowed_input_types: vec![
                "text".to_string(),
                "hidden".to_string(),
                "checkbox".to_string(),
            ],
        }
    }
}

/// Release harvesting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// File extension identifying direct release links
    pub extension: String,

    /// Leading bytes every accepted download must start with
    pub signature: String,

    /// Host of the cloud-drive share links to rewrite
    #[serde(rename = "share-host")]
    pub share_host: String,

    /// Direct-download endpoint share links are rewritten to; the file id is
    /// appended as the `id` query parameter
    #[serde(rename = "share-download-url")]
    pub share_download_url: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            extension: ".pdf".to_string(),
            signature: "%PDF".to_string(),
            share_host: "drive.google.com".to_string(),
            share_download_url: "https://drive.google.com/uc?export=download".to_string(),
        }
    }
}

/// PDF page layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Paper size of rendered pages
    #[serde(rename = "page-size")]
    pub page_size: PageSize,

    /// Page margin in points
    #[serde(rename = "margin-pt")]
    pub margin_pt: u32,

    /// Body font size in points
    #[serde(rename = "font-size-pt")]
    pub font_size_pt: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin_pt: 50,
            font_size_pt: 11,
        }
    }
}

/// Supported paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    /// Width and height in points
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::A4 => (595, 842),
            Self::Letter => (612, 792),
        }
    }
}
