//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a single attempt per resource
//! - HTML parsing and link extraction
//! - The traversal context (visited set and work stack)
//! - Overall crawl coordination

mod context;
mod coordinator;
mod fetcher;
mod parser;

pub use context::CrawlContext;
pub use coordinator::{Coordinator, CrawlReport, PageFailure, PageWarning};
pub use fetcher::{build_http_client, classify, FetchedResource, Fetcher, PageDocument};
pub use parser::{extract_hrefs, extract_title, parse_html, ParsedPage};

use crate::config::Config;
use crate::ArchiverError;

/// Runs a complete crawl operation
///
/// This is the main entry point for archiving a site. It will:
/// 1. Build the HTTP client
/// 2. Create a fresh traversal context
/// 3. Crawl depth-first from the configured root, archiving every page
///
/// # Arguments
///
/// * `config` - The archiver configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished; per-page failures are in the report
/// * `Err(ArchiverError)` - The client or the root URL could not be set up
pub async fn crawl(config: &Config) -> Result<CrawlReport, ArchiverError> {
    let fetcher = Fetcher::new(&config.http)?;
    let coordinator = Coordinator::new(config, fetcher)?;
    let mut ctx = CrawlContext::new();
    Ok(coordinator.run(&mut ctx).await)
}
