//! Wiki-Archiver main entry point
//!
//! This is the command-line interface for the documentation archiver.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use wiki_archiver::archive::ArchiveFormat;
use wiki_archiver::config::{load_config_with_hash, validate, Config};
use wiki_archiver::crawler::{Coordinator, CrawlContext, Fetcher};
use wiki_archiver::output::{print_summary, RunSummary};
use wiki_archiver::releases::ReleaseHarvester;
use wiki_archiver::url::normalize_url;
use tracing_subscriber::EnvFilter;

/// Wiki-Archiver: a same-site documentation archiver
///
/// Crawls a documentation site depth-first, stores every internal page as a
/// self-contained archival document, and downloads the release notes linked
/// from the build-history page. Files that already exist are never rewritten,
/// so re-running only fetches what is new.
#[derive(Parser, Debug)]
#[command(name = "wiki-archiver")]
#[command(version = "1.0.0")]
#[command(about = "A same-site documentation archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Page the crawl starts from
    #[arg(long, env = "ROOT_URL")]
    root_url: Option<String>,

    /// Page listing release-note downloads
    #[arg(long, env = "BUILD_HISTORY")]
    release_index: Option<String>,

    /// Knowledge directory receiving pages/ and releases/
    #[arg(long, env = "KNOWLEDGE_DIR")]
    out_dir: Option<PathBuf>,

    /// Archival format for crawled pages
    #[arg(long, value_enum)]
    format: Option<ArchiveFormat>,

    /// Do not crawl the site
    #[arg(long, conflicts_with = "skip_releases")]
    skip_crawl: bool,

    /// Do not harvest release notes
    #[arg(long)]
    skip_releases: bool,

    /// Validate config and show what would be done without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &cli);
        return Ok(());
    }

    run(config, config_hash, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_archiver=info,warn"),
            1 => EnvFilter::new("wiki_archiver=debug,info"),
            2 => EnvFilter::new("wiki_archiver=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies flag and environment overrides,
/// and validates the result
fn load_configuration(cli: &Cli) -> anyhow::Result<(Config, String)> {
    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), "defaults".to_string())
        }
    };

    if let Some(root_url) = &cli.root_url {
        config.site.root_url = root_url.clone();
    }
    if let Some(release_index) = &cli.release_index {
        config.site.release_index_url = release_index.clone();
    }
    if let Some(out_dir) = &cli.out_dir {
        config.output.knowledge_dir = out_dir.clone();
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    validate(&config).context("invalid configuration")?;
    Ok((config, config_hash))
}

/// Handles the --dry-run mode: shows what would be done
fn handle_dry_run(config: &Config, cli: &Cli) {
    println!("=== Wiki-Archiver Dry Run ===\n");

    println!("Site:");
    println!("  Root URL: {}", config.site.root_url);
    println!("  Release index: {}", config.site.release_index_url);
    println!("  Host match: {:?}", config.crawl.host_match);
    println!(
        "  Descend into archived pages: {}",
        config.crawl.descend_into_archived
    );

    println!("\nOutput:");
    println!("  Pages: {} ({})", config.output.pages_dir().display(), config.output.format);
    println!("  Releases: {}", config.output.releases_dir().display());

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Page timeout: {}s", config.http.timeout_secs);
    println!("  Download timeout: {}s", config.http.download_timeout_secs);
    if let Some(ca) = &config.http.ca_bundle {
        println!("  Extra CA bundle: {}", ca.display());
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would {} and {}",
        if cli.skip_crawl { "skip the crawl" } else { "crawl the site" },
        if cli.skip_releases {
            "skip release notes"
        } else {
            "harvest release notes"
        }
    );
}

/// Handles the main archive run
async fn run(config: Config, config_hash: String, cli: &Cli) -> anyhow::Result<()> {
    let started_at = chrono::Utc::now();

    for dir in [config.output.pages_dir(), config.output.releases_dir()] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    }

    let fetcher = Fetcher::new(&config.http).context("cannot build HTTP client")?;

    let crawl = if cli.skip_crawl {
        tracing::info!("Skipping crawl");
        None
    } else {
        let coordinator = Coordinator::new(&config, fetcher.clone())?;
        let mut ctx = CrawlContext::new();
        Some(coordinator.run(&mut ctx).await)
    };

    let harvest = if cli.skip_releases {
        tracing::info!("Skipping release notes");
        None
    } else {
        let index_url = normalize_url(&config.site.release_index_url)?;
        let harvester = ReleaseHarvester::new(
            fetcher,
            config.output.releases_dir(),
            config.releases.clone(),
        );
        match harvester.harvest(&index_url).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::error!("Error fetching release index {}: {}", index_url, e);
                None
            }
        }
    };

    let summary = RunSummary {
        started_at,
        finished_at: chrono::Utc::now(),
        config_hash,
        knowledge_dir: config.output.knowledge_dir.clone(),
        format: config.output.format,
        crawl,
        harvest,
    };
    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}
