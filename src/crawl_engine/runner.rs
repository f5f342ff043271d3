//! Background crawl execution
//!
//! Runs the orchestrator off the interactive context and delivers exactly
//! one terminal outcome per crawl: a oneshot carries success-or-failure, a
//! watch channel exposes the coarse running status. Replaces the original
//! UI-thread timer polling with a real task/channel contract.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{oneshot, watch};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::errors::CrawlError;
use crate::domain::events::{CrawlStatus, CrawlSummary};
use crate::domain::product::{CrawlRequest, CrawlResult};
use crate::crawl_engine::orchestrator::CrawlOrchestrator;
use crate::infrastructure::config::CrawlerConfig;

/// Spawns one independent crawl task per request.
///
/// Every `start` call owns its session end to end; two concurrent crawls
/// never share browser state.
pub struct CrawlTaskRunner {
    orchestrator: Arc<CrawlOrchestrator>,
}

impl CrawlTaskRunner {
    /// Runner backed by real browser sessions.
    pub fn new(config: Arc<CrawlerConfig>) -> anyhow::Result<Self> {
        Ok(Self {
            orchestrator: Arc::new(CrawlOrchestrator::new(config)?),
        })
    }

    /// Runner around an existing (possibly test-injected) orchestrator.
    pub fn with_orchestrator(orchestrator: Arc<CrawlOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// The consumer-facing entry point: validate raw input and start a crawl.
    pub fn start_search(
        &self,
        keyword: &str,
        max_items: usize,
    ) -> Result<CrawlTaskHandle, CrawlError> {
        let request = CrawlRequest::new(keyword, max_items)?;
        Ok(self.start(request))
    }

    /// Begin executing `request` on its own background task immediately.
    pub fn start(&self, request: CrawlRequest) -> CrawlTaskHandle {
        let task_id = Uuid::new_v4().to_string();
        let (status_tx, status_rx) = watch::channel(CrawlStatus::Idle);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        let orchestrator = Arc::clone(&self.orchestrator);
        let id = task_id.clone();

        tokio::spawn(async move {
            let _ = status_tx.send(CrawlStatus::Running);
            let started = Instant::now();

            let outcome = orchestrator.run(&request).await;

            match &outcome {
                Ok(result) => {
                    let _ = status_tx.send(CrawlStatus::Completed);
                    let summary = CrawlSummary {
                        task_id: id.clone(),
                        keyword: request.keyword().to_string(),
                        requested: request.max_items(),
                        collected: result.len(),
                        pages_visited: result.pages_visited,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        finished_at: Utc::now(),
                    };
                    info!(task_id = %id, ?summary, "✅ Crawl task completed");
                }
                Err(e) => {
                    let _ = status_tx.send(CrawlStatus::Failed);
                    error!(task_id = %id, error = %e, "❌ Crawl task failed");
                }
            }

            // The receiver may have been dropped by an uninterested caller.
            let _ = outcome_tx.send(outcome);
        });

        CrawlTaskHandle {
            task_id,
            status: status_rx,
            outcome: outcome_rx,
        }
    }
}

/// Caller-side handle to one background crawl.
pub struct CrawlTaskHandle {
    task_id: String,
    status: watch::Receiver<CrawlStatus>,
    outcome: oneshot::Receiver<Result<CrawlResult, CrawlError>>,
}

impl CrawlTaskHandle {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Current coarse status; cheap enough for UI polling.
    pub fn status(&self) -> CrawlStatus {
        *self.status.borrow()
    }

    /// Await the single terminal outcome.
    ///
    /// If the background task died without delivering (panic), this yields
    /// [`CrawlError::Aborted`] instead of hanging.
    pub async fn outcome(self) -> Result<CrawlResult, CrawlError> {
        match self.outcome.await {
            Ok(outcome) => outcome,
            Err(_) => Err(CrawlError::Aborted),
        }
    }
}
