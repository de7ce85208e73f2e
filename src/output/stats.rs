//! End-of-run statistics
//!
//! This module collects the crawl and harvest reports of one run and formats
//! them for the terminal.

use crate::archive::ArchiveFormat;
use crate::crawler::CrawlReport;
use crate::releases::HarvestReport;
use crate::state::PageState;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::path::PathBuf;

/// Everything worth reporting about one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config_hash: String,
    pub knowledge_dir: PathBuf,
    pub format: ArchiveFormat,
    /// None when the crawl was skipped
    pub crawl: Option<CrawlReport>,
    /// None when harvesting was skipped or the index could not be read
    pub harvest: Option<HarvestReport>,
}

impl RunSummary {
    /// Wall-clock duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Share of entered pages that have an archive after the run, in percent
    pub fn success_rate(&self) -> f64 {
        let Some(crawl) = &self.crawl else {
            return 0.0;
        };
        let visited = crawl.visited();
        if visited == 0 {
            return 0.0;
        }
        let succeeded: u64 = crawl
            .pages_by_state
            .iter()
            .filter(|(state, _)| state.is_success())
            .map(|(_, count)| count)
            .sum();
        succeeded as f64 / visited as f64 * 100.0
    }
}

/// Formats the summary as a human-readable report
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Archive Summary ===\n");
    let _ = writeln!(out, "Run:");
    let _ = writeln!(out, "  Started: {}", summary.started_at.to_rfc3339());
    let _ = writeln!(out, "  Finished: {}", summary.finished_at.to_rfc3339());
    let _ = writeln!(out, "  Duration: {:.1}s", summary.duration_seconds());
    let _ = writeln!(out, "  Config hash: {}", summary.config_hash);
    let _ = writeln!(out, "  Output directory: {}", summary.knowledge_dir.display());
    let _ = writeln!(out);

    match &summary.crawl {
        Some(crawl) => {
            let _ = writeln!(out, "Pages ({}):", summary.format);
            let _ = writeln!(out, "  Visited: {}", crawl.visited());

            // Sort states by count (descending), then by name for stable output
            let mut state_counts: Vec<_> = crawl
                .pages_by_state
                .iter()
                .filter(|(_, count)| **count > 0)
                .collect();
            state_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.as_str().cmp(b.0.as_str())));
            for (state, count) in state_counts {
                let _ = writeln!(out, "  {}: {}", state, count);
            }
            let _ = writeln!(
                out,
                "  Success rate: {:.1}% ({} / {} pages archived)",
                summary.success_rate(),
                crawl.count(PageState::Archived) + crawl.count(PageState::AlreadyArchived),
                crawl.visited()
            );
            let _ = writeln!(out);

            if !crawl.failures.is_empty() {
                let _ = writeln!(out, "Failures ({}):", crawl.failures.len());
                for failure in &crawl.failures {
                    let _ = writeln!(out, "  - [{}] {}: {}", failure.state, failure.url, failure.message);
                }
                let _ = writeln!(out);
            }

            if !crawl.warnings.is_empty() {
                let _ = writeln!(out, "Cleaning warnings: {}", crawl.warnings.len());
                let _ = writeln!(out);
            }
        }
        None => {
            let _ = writeln!(out, "Pages: crawl skipped\n");
        }
    }

    match &summary.harvest {
        Some(harvest) => {
            let _ = writeln!(out, "Releases:");
            let _ = writeln!(out, "  Downloaded: {}", harvest.saved);
            let _ = writeln!(out, "  Already present: {}", harvest.already_present);
            let _ = writeln!(out, "  Forbidden: {}", harvest.forbidden);
            let _ = writeln!(out, "  Rejected (bad signature): {}", harvest.rejected);
            let _ = writeln!(out, "  Failed: {}", harvest.failed);
        }
        None => {
            let _ = writeln!(out, "Releases: not harvested");
        }
    }

    out
}

/// Prints the summary to stdout
pub fn print_summary(summary: &RunSummary) {
    print!("{}", render_summary(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn summary(crawl: Option<CrawlReport>, harvest: Option<HarvestReport>) -> RunSummary {
        let started_at = Utc::now();
        RunSummary {
            started_at,
            finished_at: started_at + chrono::Duration::milliseconds(2500),
            config_hash: "abc123".to_string(),
            knowledge_dir: PathBuf::from("kb"),
            format: ArchiveFormat::Pdf,
            crawl,
            harvest,
        }
    }

    #[test]
    fn test_success_rate() {
        let mut pages_by_state = HashMap::new();
        pages_by_state.insert(PageState::Archived, 3);
        pages_by_state.insert(PageState::AlreadyArchived, 1);
        pages_by_state.insert(PageState::FetchFailed, 4);
        let crawl = CrawlReport {
            pages_by_state,
            ..CrawlReport::default()
        };

        let summary = summary(Some(crawl), None);
        assert_eq!(summary.success_rate(), 50.0);
        assert_eq!(summary.duration_seconds(), 2.5);
    }

    #[test]
    fn test_render_summary_sections() {
        let harvest = HarvestReport {
            saved: 2,
            forbidden: 1,
            ..HarvestReport::default()
        };
        let text = render_summary(&summary(None, Some(harvest)));

        assert!(text.contains("Config hash: abc123"));
        assert!(text.contains("crawl skipped"));
        assert!(text.contains("Downloaded: 2"));
        assert!(text.contains("Forbidden: 1"));
    }
}
