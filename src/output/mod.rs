//! Output module for run summaries
//!
//! This module handles formatting and printing the statistics of one run:
//! pages per state, failures, cleaning warnings and release downloads.

pub mod stats;

pub use stats::{print_summary, render_summary, RunSummary};
