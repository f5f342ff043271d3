//! Lifecycle status and summary types for crawl tasks
//!
//! The engine promises exactly two terminal outcomes per crawl; everything
//! here is coarse observability around them. Consumers that want richer
//! progress animation poll or render independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse status of one background crawl task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CrawlStatus {
    /// Task created but not yet scheduled.
    Idle,
    /// The crawl is actively running on its background task.
    Running,
    /// The crawl delivered a successful (possibly empty) result.
    Completed,
    /// The crawl delivered a fatal error.
    Failed,
}

impl std::fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlStatus::Idle => write!(f, "idle"),
            CrawlStatus::Running => write!(f, "running"),
            CrawlStatus::Completed => write!(f, "completed"),
            CrawlStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal summary logged when a crawl finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// Unique id of the background task that produced the result.
    pub task_id: String,
    /// The search keyword the crawl ran with.
    pub keyword: String,
    /// Item budget after clamping.
    pub requested: usize,
    /// How many records were actually collected.
    pub collected: usize,
    /// Listing pages processed before the traversal stopped.
    pub pages_visited: u32,
    /// Wall-clock duration of the crawl in milliseconds.
    pub elapsed_ms: u64,
    pub finished_at: DateTime<Utc>,
}
