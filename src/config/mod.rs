//! Configuration module for Wiki-Archiver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so running without a file is valid.
//!
//! # Example
//!
//! ```no_run
//! use wiki_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Crawl starts at: {}", config.site.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, HttpConfig, OutputConfig, PageSize, ReleaseConfig, RenderConfig,
    SanitizeConfig, SiteConfig, DEFAULT_KNOWLEDGE_DIR, DEFAULT_RELEASE_INDEX_URL,
    DEFAULT_ROOT_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
