//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: Tracks the state of an individual page within one run

mod page_state;

// Re-export main types
pub use page_state::PageState;
