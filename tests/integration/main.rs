//! Integration tests for wiki-archiver
//!
//! Every test runs against a local wiremock server and writes into a
//! temporary knowledge directory.

mod common;
mod crawl_tests;
mod release_tests;
