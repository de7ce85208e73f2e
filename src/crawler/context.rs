//! Traversal context for one crawl run
//!
//! The context owns the visited set and the LIFO work stack. It is created by
//! the caller and lent to the coordinator, so tests can seed it with URLs that
//! must be treated as already processed.

use crate::state::PageState;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Visited set, work stack, and per-page outcomes of one run
#[derive(Debug, Default)]
pub struct CrawlContext {
    visited: HashSet<String>,
    stack: Vec<Url>,
    states: HashMap<String, PageState>,
    order: Vec<String>,
}

impl CrawlContext {
    /// Creates an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context whose visited set already contains `urls`
    ///
    /// Seeded URLs are never fetched during the run.
    pub fn with_visited<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            visited: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Pushes a URL onto the work stack
    pub fn push(&mut self, url: Url) {
        self.stack.push(url);
    }

    /// Pushes discovered links so the first one is popped first
    pub fn push_children(&mut self, links: Vec<Url>) {
        for link in links.into_iter().rev() {
            if !self.is_visited(link.as_str()) {
                self.stack.push(link);
            }
        }
    }

    /// Pops the next URL that has not been visited yet
    pub fn next_unvisited(&mut self) -> Option<Url> {
        while let Some(url) = self.stack.pop() {
            if !self.is_visited(url.as_str()) {
                return Some(url);
            }
        }
        None
    }

    /// Marks a URL visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        let inserted = self.visited.insert(url.to_string());
        if inserted {
            self.order.push(url.to_string());
            self.states.insert(url.to_string(), PageState::Unvisited);
        }
        inserted
    }

    /// Returns true if the URL was visited in this run (or seeded)
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Records a state transition for a visited URL
    ///
    /// Illegal transitions are logged and ignored.
    pub fn set_state(&mut self, url: &str, next: PageState) {
        let current = self
            .states
            .get(url)
            .copied()
            .unwrap_or(PageState::Unvisited);

        if current.can_transition_to(next) {
            self.states.insert(url.to_string(), next);
        } else {
            tracing::warn!(
                "Ignoring invalid state transition for {}: {} -> {}",
                url,
                current,
                next
            );
        }
    }

    /// Current state of a URL, if it was visited in this run
    pub fn state(&self, url: &str) -> Option<PageState> {
        self.states.get(url).copied()
    }

    /// URLs entered in this run, in visiting order (seeded URLs excluded)
    pub fn visit_order(&self) -> &[String] {
        &self.order
    }

    /// Number of URLs entered in this run
    pub fn visited_count(&self) -> usize {
        self.order.len()
    }

    /// Number of URLs still waiting on the stack (may include duplicates)
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    /// Counts entered pages by their current state
    pub fn counts_by_state(&self) -> HashMap<PageState, u64> {
        let mut counts = HashMap::new();
        for state in self.states.values() {
            *counts.entry(*state).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_mark_visited_once() {
        let mut ctx = CrawlContext::new();
        assert!(ctx.mark_visited("https://example.com/a"));
        assert!(!ctx.mark_visited("https://example.com/a"));
        assert_eq!(ctx.visited_count(), 1);
    }

    #[test]
    fn test_children_popped_in_document_order() {
        let mut ctx = CrawlContext::new();
        ctx.push_children(vec![
            url("https://example.com/a"),
            url("https://example.com/b"),
            url("https://example.com/c"),
        ]);

        assert_eq!(ctx.next_unvisited().unwrap().as_str(), "https://example.com/a");
        assert_eq!(ctx.next_unvisited().unwrap().as_str(), "https://example.com/b");
        assert_eq!(ctx.next_unvisited().unwrap().as_str(), "https://example.com/c");
        assert!(ctx.next_unvisited().is_none());
    }

    #[test]
    fn test_next_unvisited_skips_visited_entries() {
        let mut ctx = CrawlContext::new();
        ctx.push(url("https://example.com/a"));
        ctx.push(url("https://example.com/b"));
        ctx.mark_visited("https://example.com/b");

        assert_eq!(ctx.next_unvisited().unwrap().as_str(), "https://example.com/a");
        assert!(ctx.next_unvisited().is_none());
    }

    #[test]
    fn test_seeded_context() {
        let ctx = CrawlContext::with_visited(["https://example.com/skip"]);
        assert!(ctx.is_visited("https://example.com/skip"));
        assert_eq!(ctx.visited_count(), 0);
    }

    #[test]
    fn test_state_transitions_recorded() {
        let mut ctx = CrawlContext::new();
        let page = "https://example.com/a";
        ctx.mark_visited(page);

        ctx.set_state(page, PageState::InProgress);
        ctx.set_state(page, PageState::Archived);
        assert_eq!(ctx.state(page), Some(PageState::Archived));

        // Terminal states stay terminal
        ctx.set_state(page, PageState::InProgress);
        assert_eq!(ctx.state(page), Some(PageState::Archived));

        let counts = ctx.counts_by_state();
        assert_eq!(counts.get(&PageState::Archived), Some(&1));
    }
}
