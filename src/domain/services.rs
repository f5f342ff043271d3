//! Domain service traits for the crawling engine
//!
//! The browser is an external capability behind these seams: the pagination
//! loop and the orchestrator only ever talk to a [`SearchSession`], and
//! sessions are minted per crawl by a [`SessionProvider`]. Infrastructure
//! provides the chromiumoxide implementations; tests provide scripted fakes.

use async_trait::async_trait;

use crate::domain::errors::{CrawlError, PageError};

/// Observed state of the listing's next-page control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControlState {
    /// Control present and clickable.
    Available,
    /// Control present but marked disabled (last page).
    Disabled,
    /// No control on the page at all.
    Absent,
}

/// One live, exclusively-owned search session.
///
/// A session is positioned by [`begin_search`](Self::begin_search) and then
/// driven page by page. All waiting (navigation, element presence, pacing)
/// blocks inside the session, on the crawl's own background task.
#[async_trait]
pub trait SearchSession: Send {
    /// Clear prior session state, navigate to page 1 of results for
    /// `keyword` and apply the pacing delay.
    ///
    /// Fatal on failure: a crawl that cannot reach its first page has
    /// nothing to degrade to.
    async fn begin_search(&mut self, keyword: &str) -> Result<(), CrawlError>;

    /// Block until at least one result item is present on the current page,
    /// up to the configured element wait window.
    async fn wait_for_items(&mut self) -> Result<(), PageError>;

    /// Rendered HTML of the current listing page.
    async fn listing_html(&mut self) -> Result<String, PageError>;

    /// Inspect the next-page control without activating it.
    async fn next_control(&mut self) -> NextControlState;

    /// Activate the next-page control and apply the pacing delay.
    ///
    /// Only called after [`next_control`](Self::next_control) reported
    /// [`NextControlState::Available`]; the control may still have gone
    /// stale in between, which is a recoverable [`PageError`].
    async fn advance_to_next_page(&mut self) -> Result<(), PageError>;

    /// Release the session. Idempotent; never fails.
    async fn close(&mut self);
}

/// Mints one independent [`SearchSession`] per crawl.
///
/// Each orchestrated run owns its session end to end; providers must never
/// hand the same live session to two crawls.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn SearchSession>, CrawlError>;
}
