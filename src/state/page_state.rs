/// Page state definitions for tracking crawl progress
///
/// This module defines all possible states a page can be in during one run.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page has been discovered but not yet entered
    Unvisited,

    /// Page is being fetched, cleaned, or rendered
    InProgress,

    // ===== Terminal Success States =====
    /// Page was fetched and a new archive file was written
    Archived,

    /// Archive file already existed; nothing was rendered
    AlreadyArchived,

    // ===== Terminal Error States =====
    /// Page could not be fetched (transport error, non-2xx, not HTML)
    FetchFailed,

    /// Page was fetched but could not be rendered or written
    RenderFailed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (page may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Unvisited | Self::InProgress)
    }

    /// Returns true if an archive file exists for the page after this state
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Archived | Self::AlreadyArchived)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::RenderFailed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// `Unvisited → InProgress → (Archived | AlreadyArchived | FetchFailed | RenderFailed)`.
    /// A page may also go straight from `Unvisited` to `AlreadyArchived` when
    /// archived pages are not revisited.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        match (self, next) {
            (Self::Unvisited, Self::InProgress) => true,
            (Self::Unvisited, Self::AlreadyArchived) => true,
            (Self::InProgress, next) => next.is_terminal(),
            _ => false,
        }
    }

    /// Short lowercase label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unvisited => "unvisited",
            Self::InProgress => "in_progress",
            Self::Archived => "archived",
            Self::AlreadyArchived => "already_archived",
            Self::FetchFailed => "fetch_failed",
            Self::RenderFailed => "render_failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Unvisited,
            Self::InProgress,
            Self::Archived,
            Self::AlreadyArchived,
            Self::FetchFailed,
            Self::RenderFailed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
