//! Crawl orchestration
//!
//! The single entry point external callers use. One `run` owns one browser
//! session end to end: open, search, paginate, truncate, close. The close
//! is guaranteed on every exit path.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::errors::CrawlError;
use crate::domain::product::{CrawlRequest, CrawlResult};
use crate::domain::services::{SearchSession, SessionProvider};
use crate::crawl_engine::pagination::PaginationController;
use crate::infrastructure::browser_session::ChromiumSessionProvider;
use crate::infrastructure::config::CrawlerConfig;
use crate::infrastructure::product_extractor::ProductExtractor;

/// Composes session, search, and pagination into one bounded
/// search-and-collect operation.
pub struct CrawlOrchestrator {
    provider: Arc<dyn SessionProvider>,
    extractor: ProductExtractor,
    config: Arc<CrawlerConfig>,
}

impl CrawlOrchestrator {
    /// Orchestrator backed by real chromiumoxide sessions.
    pub fn new(config: Arc<CrawlerConfig>) -> anyhow::Result<Self> {
        let provider = Arc::new(ChromiumSessionProvider::new(Arc::clone(&config)));
        Self::with_provider(provider, config)
    }

    /// Orchestrator with an injected session provider.
    pub fn with_provider(
        provider: Arc<dyn SessionProvider>,
        config: Arc<CrawlerConfig>,
    ) -> anyhow::Result<Self> {
        let extractor = ProductExtractor::new(&config.selectors, &config.search.base_url)?;
        Ok(Self {
            provider,
            extractor,
            config,
        })
    }

    /// Run one bounded crawl.
    ///
    /// Only session startup and initial navigation are terminal; every other
    /// problem degrades into a shorter (possibly empty) successful result.
    pub async fn run(&self, request: &CrawlRequest) -> Result<CrawlResult, CrawlError> {
        let request = request
            .clone()
            .clamped_to(self.config.limits.max_items_ceiling);

        info!(
            keyword = request.keyword(),
            max_items = request.max_items(),
            "Starting crawl"
        );

        let mut session = self.provider.open_session().await.map_err(|e| {
            error!(error = %e, "Browser session could not be opened");
            e
        })?;

        let outcome = self.run_with_session(session.as_mut(), &request).await;

        // Teardown happens exactly once, on success and failure alike.
        session.close().await;

        match &outcome {
            Ok(result) => info!(
                collected = result.len(),
                pages = result.pages_visited,
                "Crawl finished"
            ),
            Err(e) => error!(error = %e, "Crawl failed"),
        }
        outcome
    }

    async fn run_with_session(
        &self,
        session: &mut dyn SearchSession,
        request: &CrawlRequest,
    ) -> Result<CrawlResult, CrawlError> {
        session.begin_search(request.keyword()).await?;

        let controller = PaginationController::new(self.config.limits.max_pages);
        let traversal = controller
            .collect(session, &self.extractor, request.max_items())
            .await;

        let mut records = traversal.records;
        records.truncate(request.max_items());

        Ok(CrawlResult {
            records,
            pages_visited: traversal.pages_visited,
        })
    }
}
