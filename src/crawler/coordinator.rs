//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the depth-first crawl loop that ties together:
//! - The traversal context (visited set and LIFO work stack)
//! - Page fetching
//! - Asset inlining and archiving
//! - Link extraction and scoping
//!
//! Every fetch is awaited before the next one starts. Per-page failures are
//! logged, recorded in the page state and never abort the run.

use crate::archive::{ArchiveEntry, ArchiveOutcome, PageArchiver};
use crate::config::{Config, CrawlConfig, SanitizeConfig};
use crate::crawler::context::CrawlContext;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::parse_html;
use crate::inliner::{clean, CleanWarning};
use crate::state::PageState;
use crate::url::LinkScope;
use crate::{ArchiverError, RenderError};
use std::collections::HashMap;
use url::Url;

/// A degradation recorded while cleaning one page
#[derive(Debug, Clone)]
pub struct PageWarning {
    pub url: String,
    pub warning: CleanWarning,
}

/// A page that ended in an error state
#[derive(Debug, Clone)]
pub struct PageFailure {
    pub url: String,
    pub state: PageState,
    pub message: String,
}

/// Outcome of one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Pages entered in this run, by final state
    pub pages_by_state: HashMap<PageState, u64>,
    /// Archives written in this run, in visiting order
    pub written: Vec<ArchiveEntry>,
    pub warnings: Vec<PageWarning>,
    pub failures: Vec<PageFailure>,
}

impl CrawlReport {
    /// Number of pages that ended in `state`
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Number of pages entered in this run
    pub fn visited(&self) -> u64 {
        self.pages_by_state.values().sum()
    }
}

/// Main crawler coordinator structure
#[derive(Debug)]
pub struct Coordinator {
    fetcher: Fetcher,
    archiver: PageArchiver,
    scope: LinkScope,
    sanitize: SanitizeConfig,
    crawl: CrawlConfig,
}

impl Coordinator {
    /// Creates a coordinator for the configured site
    ///
    /// # Arguments
    ///
    /// * `config` - The archiver configuration
    /// * `fetcher` - Shared fetcher; also used for image downloads
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ArchiverError)` - The root URL is not a crawlable http(s) URL
    pub fn new(config: &Config, fetcher: Fetcher) -> Result<Self, ArchiverError> {
        let scope = LinkScope::new(&config.site.root_url, config.crawl.host_match)?;
        let archiver = PageArchiver::from_config(&config.output, &config.render);

        Ok(Self::with_parts(
            fetcher,
            archiver,
            scope,
            config.sanitize.clone(),
            config.crawl.clone(),
        ))
    }

    /// Assembles a coordinator from prepared parts
    pub fn with_parts(
        fetcher: Fetcher,
        archiver: PageArchiver,
        scope: LinkScope,
        sanitize: SanitizeConfig,
        crawl: CrawlConfig,
    ) -> Self {
        Self {
            fetcher,
            archiver,
            scope,
            sanitize,
            crawl,
        }
    }

    pub fn scope(&self) -> &LinkScope {
        &self.scope
    }

    pub fn archiver(&self) -> &PageArchiver {
        &self.archiver
    }

    /// Runs the depth-first crawl from the scope's root
    ///
    /// URLs already in `ctx`'s visited set are never fetched. The loop ends
    /// when the work stack is empty; every URL is entered at most once, so it
    /// always terminates.
    pub async fn run(&self, ctx: &mut CrawlContext) -> CrawlReport {
        let start_time = std::time::Instant::now();
        let mut report = CrawlReport::default();

        tracing::info!("Starting crawl at {}", self.scope.root());
        ctx.push(self.scope.root().clone());

        let mut pages_entered: u64 = 0;
        while let Some(url) = ctx.next_unvisited() {
            self.process_page(&url, ctx, &mut report).await;
            pages_entered += 1;

            if pages_entered % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages entered, {} links pending",
                    pages_entered,
                    ctx.pending()
                );
            }
        }

        report.pages_by_state = ctx.counts_by_state();

        tracing::info!(
            "Crawl completed: {} pages in {:?} ({} archived, {} already archived, {} failed)",
            ctx.visited_count(),
            start_time.elapsed(),
            report.count(PageState::Archived),
            report.count(PageState::AlreadyArchived),
            report.count(PageState::FetchFailed) + report.count(PageState::RenderFailed),
        );

        report
    }

    /// Processes a single URL
    ///
    /// This method:
    /// 1. Marks the URL visited
    /// 2. Fetches the page (unless it is archived and not descended into)
    /// 3. Cleans and archives it if no archive exists yet
    /// 4. Pushes its internal links onto the work stack
    async fn process_page(&self, url: &Url, ctx: &mut CrawlContext, report: &mut CrawlReport) {
        let key = url.as_str();
        if !ctx.mark_visited(key) {
            return;
        }

        let already_archived = self.archiver.is_archived(url);
        if already_archived && !self.crawl.descend_into_archived {
            tracing::debug!("Skipping archived page {}", url);
            ctx.set_state(key, PageState::AlreadyArchived);
            return;
        }

        ctx.set_state(key, PageState::InProgress);
        tracing::debug!("Processing URL: {}", url);

        let page = match self.fetcher.get_page(key).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                ctx.set_state(key, PageState::FetchFailed);
                report.failures.push(PageFailure {
                    url: key.to_string(),
                    state: PageState::FetchFailed,
                    message: e.to_string(),
                });
                return;
            }
        };

        let state = if already_archived {
            PageState::AlreadyArchived
        } else {
            match self.archive_page(url, &page.html, report).await {
                Ok(ArchiveOutcome::Written(entry)) => {
                    report.written.push(entry);
                    PageState::Archived
                }
                Ok(ArchiveOutcome::AlreadyArchived) => PageState::AlreadyArchived,
                Err(e) => {
                    tracing::error!("Failed to archive {}: {}", url, e);
                    report.failures.push(PageFailure {
                        url: key.to_string(),
                        state: PageState::RenderFailed,
                        message: e.to_string(),
                    });
                    PageState::RenderFailed
                }
            }
        };
        ctx.set_state(key, state);

        // Links are followed regardless of the archive outcome
        let parsed = parse_html(&page.html, url, &self.scope);
        tracing::debug!("Found {} internal links on {}", parsed.links.len(), url);
        ctx.push_children(parsed.links);
    }

    /// Inlines assets when the format needs them, then writes the archive
    async fn archive_page(
        &self,
        url: &Url,
        raw_html: &str,
        report: &mut CrawlReport,
    ) -> Result<ArchiveOutcome, RenderError> {
        if !self.archiver.needs_inlined_assets() {
            return self.archiver.archive(url, raw_html);
        }

        let cleaned = clean(raw_html, url, &self.fetcher, &self.sanitize).await?;
        for warning in cleaned.warnings {
            tracing::warn!("{}: {}", url, warning);
            report.warnings.push(PageWarning {
                url: url.to_string(),
                warning,
            });
        }

        self.archiver.archive(url, &cleaned.html)
    }
}
