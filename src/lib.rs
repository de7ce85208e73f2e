//! Wiki-Archiver: a same-site documentation archiver
//!
//! This crate crawls a documentation site depth-first, turns every internal page
//! into a self-contained archival document, and harvests release-note binaries
//! linked from an index page into a content-addressed knowledge directory.

pub mod archive;
pub mod config;
pub mod crawler;
pub mod inliner;
pub mod output;
pub mod releases;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Wiki-Archiver operations
#[derive(Debug, Error)]
pub enum ArchiverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Content at {url} does not start with the expected {expected} signature")]
    ContentMismatch { url: String, expected: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors raised by a single fetch attempt
///
/// Every variant is scoped to one page or resource; callers log it and move on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    NotHtml { url: String, content_type: String },
}

impl FetchError {
    /// Returns the HTTP status code if the server answered with one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for a 403 answer
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }
}

/// Errors raised while converting cleaned HTML into an archival document
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(String),

    #[error("Image could not be embedded: {0}")]
    Image(String),

    #[error("HTML rewrite failed: {0}")]
    Sanitize(String),

    #[error("IO error while writing archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Wiki-Archiver operations
pub type Result<T> = std::result::Result<T, ArchiverError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use archive::{ArchiveFormat, PageArchiver};
pub use config::Config;
pub use crawler::{Coordinator, CrawlContext, Fetcher};
pub use inliner::clean;
pub use releases::{HarvestReport, ReleaseHarvester};
pub use state::PageState;
pub use crate::url::{archive_file_name, is_internal, HostMatch, LinkScope};
