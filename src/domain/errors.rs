//! Error taxonomy for the crawling engine
//!
//! Two tiers, and the distinction is part of the public contract:
//! - [`CrawlError`]: fatal, aborts the whole crawl and is surfaced to the caller
//! - [`PageError`]: recoverable, degrades the result's completeness and is only logged

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal crawl errors surfaced as the terminal failure outcome.
///
/// Everything else (page timeouts, missing fields, dead pagination controls)
/// degrades the result instead of failing it: the caller either gets one of
/// these kinds or a (possibly empty) successful result, never both.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CrawlError {
    /// Request rejected before a session was opened (empty keyword, zero budget).
    #[error("Invalid crawl request: {0}")]
    InvalidRequest(String),

    /// The browser process or its DevTools connection could not be started.
    #[error("Browser session initialization failed: {0}")]
    SessionInit(String),

    /// Initial navigation to the search results page failed or timed out.
    #[error("Search navigation failed: {0}")]
    Navigation(String),

    /// The background task terminated without delivering an outcome.
    #[error("Crawl task aborted before delivering an outcome")]
    Aborted,
}

/// Recoverable per-page problems inside the pagination loop.
///
/// Any of these stops or narrows the traversal but still yields a success
/// outcome with whatever was collected so far.
#[derive(Error, Debug, Clone)]
pub enum PageError {
    /// No result item appeared within the element wait window.
    #[error("Timed out after {waited_ms}ms waiting for result items")]
    ItemWaitTimeout { waited_ms: u64 },

    /// The rendered listing HTML could not be read from the page.
    #[error("Failed to read listing content: {0}")]
    Content(String),

    /// The next-page control exists but could not be activated.
    #[error("Next-page control interaction failed: {0}")]
    NextControl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_render_their_context() {
        let err = CrawlError::SessionInit("chrome executable not found".into());
        assert!(err.to_string().contains("chrome executable not found"));

        let err = CrawlError::Navigation("timeout after 30s".into());
        assert!(err.to_string().contains("timeout after 30s"));
    }

    #[test]
    fn page_errors_are_distinguishable() {
        let timeout = PageError::ItemWaitTimeout { waited_ms: 10_000 };
        assert!(timeout.to_string().contains("10000ms"));
        assert!(matches!(timeout, PageError::ItemWaitTimeout { .. }));
    }
}
