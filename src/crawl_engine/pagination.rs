//! Page-traversal state machine
//!
//! Accumulates records across listing pages until the item budget is met,
//! the site runs out of pages, or the page cap is hit. Every per-page
//! problem degrades the traversal instead of failing it: the controller
//! always returns whatever was collected so far.

use tracing::{debug, info, warn};

use crate::domain::product::ProductRecord;
use crate::domain::services::{NextControlState, SearchSession};
use crate::infrastructure::product_extractor::ProductExtractor;

/// Phases of the traversal loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationPhase {
    /// Waiting for at least one result item on the current page.
    AwaitingPage,
    /// Extracting records from the rendered listing.
    Extracting,
    /// Deciding whether to advance to the next page.
    DecidingContinuation,
    /// Traversal finished.
    Done,
}

/// What one traversal produced.
#[derive(Debug, Clone, Default)]
pub struct TraversalOutcome {
    /// Records in first-seen order across pages.
    pub records: Vec<ProductRecord>,
    /// Pages that were actually extracted from.
    pub pages_visited: u32,
}

/// Drives the page-by-page traversal over one [`SearchSession`].
pub struct PaginationController {
    max_pages: u32,
}

impl PaginationController {
    pub fn new(max_pages: u32) -> Self {
        Self { max_pages }
    }

    /// Collect up to `max_items` records starting from the session's current
    /// results page.
    pub async fn collect(
        &self,
        session: &mut dyn SearchSession,
        extractor: &ProductExtractor,
        max_items: usize,
    ) -> TraversalOutcome {
        let mut phase = PaginationPhase::AwaitingPage;
        let mut records: Vec<ProductRecord> = Vec::new();
        let mut page_no: u32 = 1;
        let mut pages_visited: u32 = 0;

        loop {
            match phase {
                PaginationPhase::AwaitingPage => match session.wait_for_items().await {
                    Ok(()) => phase = PaginationPhase::Extracting,
                    Err(e) => {
                        // Per-page failure: keep what we have.
                        warn!(page = page_no, error = %e, "No result items appeared, stopping pagination");
                        phase = PaginationPhase::Done;
                    }
                },

                PaginationPhase::Extracting => {
                    pages_visited += 1;
                    match session.listing_html().await {
                        Ok(html) => {
                            let remaining = max_items.saturating_sub(records.len());
                            let extraction = extractor.extract_listing(&html, remaining);
                            info!(
                                page = page_no,
                                collected = extraction.records.len(),
                                skipped = extraction.items_skipped,
                                total = records.len() + extraction.records.len(),
                                "Extracted listing page"
                            );
                            records.extend(extraction.records);
                            phase = PaginationPhase::DecidingContinuation;
                        }
                        Err(e) => {
                            warn!(page = page_no, error = %e, "Could not read listing page, stopping pagination");
                            phase = PaginationPhase::Done;
                        }
                    }
                }

                PaginationPhase::DecidingContinuation => {
                    if records.len() >= max_items {
                        debug!(page = page_no, "Item budget reached");
                        phase = PaginationPhase::Done;
                        continue;
                    }

                    match session.next_control().await {
                        NextControlState::Absent => {
                            debug!(page = page_no, "No next-page control, stopping");
                            phase = PaginationPhase::Done;
                        }
                        NextControlState::Disabled => {
                            debug!(page = page_no, "Next-page control disabled, stopping");
                            phase = PaginationPhase::Done;
                        }
                        NextControlState::Available => {
                            if page_no + 1 > self.max_pages {
                                info!(
                                    max_pages = self.max_pages,
                                    collected = records.len(),
                                    "Page cap reached, stopping regardless of remaining demand"
                                );
                                phase = PaginationPhase::Done;
                            } else {
                                match session.advance_to_next_page().await {
                                    Ok(()) => {
                                        page_no += 1;
                                        phase = PaginationPhase::AwaitingPage;
                                    }
                                    Err(e) => {
                                        // Unclickable control is the same as no more pages.
                                        warn!(page = page_no, error = %e, "Next-page activation failed, stopping");
                                        phase = PaginationPhase::Done;
                                    }
                                }
                            }
                        }
                    }
                }

                PaginationPhase::Done => break,
            }
        }

        TraversalOutcome {
            records,
            pages_visited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{CrawlError, PageError};
    use crate::infrastructure::config::SelectorConfig;
    use async_trait::async_trait;

    /// Scripted stand-in for a live browser session.
    struct FakeSession {
        pages: Vec<FakePage>,
        current: usize,
        advance_fails: bool,
    }

    struct FakePage {
        /// 0 items means the wait times out on this page.
        items: usize,
        next: NextControlState,
    }

    impl FakeSession {
        fn new(pages: Vec<FakePage>) -> Self {
            Self {
                pages,
                current: 0,
                advance_fails: false,
            }
        }

        fn page(&self) -> &FakePage {
            &self.pages[self.current]
        }

        fn render(&self) -> String {
            let items: String = (0..self.page().items)
                .map(|i| {
                    format!(
                        r#"<li class="search-product"><a class="search-product-link" href="/vp/products/p{page}-{i}"><div class="name">item p{page}-{i}</div><strong class="price-value">1,000</strong></a></li>"#,
                        page = self.current + 1,
                    )
                })
                .collect();
            format!("<html><body><ul>{items}</ul></body></html>")
        }
    }

    #[async_trait]
    impl SearchSession for FakeSession {
        async fn begin_search(&mut self, _keyword: &str) -> Result<(), CrawlError> {
            Ok(())
        }

        async fn wait_for_items(&mut self) -> Result<(), PageError> {
            if self.page().items == 0 {
                return Err(PageError::ItemWaitTimeout { waited_ms: 10_000 });
            }
            Ok(())
        }

        async fn listing_html(&mut self) -> Result<String, PageError> {
            Ok(self.render())
        }

        async fn next_control(&mut self) -> NextControlState {
            self.page().next
        }

        async fn advance_to_next_page(&mut self) -> Result<(), PageError> {
            if self.advance_fails {
                return Err(PageError::NextControl("click intercepted".to_string()));
            }
            self.current += 1;
            Ok(())
        }

        async fn close(&mut self) {}
    }

    fn extractor() -> ProductExtractor {
        ProductExtractor::new(&SelectorConfig::default(), "https://www.coupang.com").unwrap()
    }

    #[tokio::test]
    async fn stops_on_first_page_when_budget_is_met() {
        let mut session = FakeSession::new(vec![
            FakePage {
                items: 10,
                next: NextControlState::Available,
            },
            FakePage {
                items: 10,
                next: NextControlState::Available,
            },
        ]);

        let outcome = PaginationController::new(5)
            .collect(&mut session, &extractor(), 10)
            .await;

        assert_eq!(outcome.records.len(), 10);
        assert_eq!(outcome.pages_visited, 1);
        assert_eq!(session.current, 0);
    }

    #[tokio::test]
    async fn spills_onto_the_next_page_in_first_seen_order() {
        let mut session = FakeSession::new(vec![
            FakePage {
                items: 10,
                next: NextControlState::Available,
            },
            FakePage {
                items: 10,
                next: NextControlState::Available,
            },
        ]);

        let outcome = PaginationController::new(5)
            .collect(&mut session, &extractor(), 15)
            .await;

        assert_eq!(outcome.records.len(), 15);
        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(outcome.records[0].name, "item p1-0");
        assert_eq!(outcome.records[9].name, "item p1-9");
        assert_eq!(outcome.records[10].name, "item p2-0");
        assert_eq!(outcome.records[14].name, "item p2-4");
    }

    #[tokio::test]
    async fn never_visits_more_than_max_pages() {
        let pages = (0..10)
            .map(|_| FakePage {
                items: 2,
                next: NextControlState::Available,
            })
            .collect();
        let mut session = FakeSession::new(pages);

        let outcome = PaginationController::new(5)
            .collect(&mut session, &extractor(), 1000)
            .await;

        assert_eq!(outcome.pages_visited, 5);
        assert_eq!(outcome.records.len(), 10);
    }

    #[tokio::test]
    async fn mid_crawl_timeout_returns_partial_result() {
        let mut session = FakeSession::new(vec![
            FakePage {
                items: 4,
                next: NextControlState::Available,
            },
            FakePage {
                items: 4,
                next: NextControlState::Available,
            },
            FakePage {
                items: 0,
                next: NextControlState::Available,
            },
        ]);

        let outcome = PaginationController::new(5)
            .collect(&mut session, &extractor(), 20)
            .await;

        assert_eq!(outcome.records.len(), 8);
        assert_eq!(outcome.pages_visited, 2);
    }

    #[tokio::test]
    async fn disabled_next_control_ends_the_traversal() {
        let mut session = FakeSession::new(vec![FakePage {
            items: 3,
            next: NextControlState::Disabled,
        }]);

        let outcome = PaginationController::new(5)
            .collect(&mut session, &extractor(), 20)
            .await;

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.pages_visited, 1);
    }

    #[tokio::test]
    async fn failed_next_activation_degrades_to_done() {
        let mut session = FakeSession::new(vec![FakePage {
            items: 3,
            next: NextControlState::Available,
        }]);
        session.advance_fails = true;

        let outcome = PaginationController::new(5)
            .collect(&mut session, &extractor(), 20)
            .await;

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.pages_visited, 1);
    }

    #[tokio::test]
    async fn empty_first_page_yields_empty_outcome() {
        let mut session = FakeSession::new(vec![FakePage {
            items: 0,
            next: NextControlState::Absent,
        }]);

        let outcome = PaginationController::new(5)
            .collect(&mut session, &extractor(), 10)
            .await;

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.pages_visited, 0);
    }
}
