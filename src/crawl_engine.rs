//! Crawl engine - traversal, orchestration, and background execution
//!
//! The engine composes the infrastructure session and extractor behind the
//! domain seams into one bounded search-and-collect operation, and wraps it
//! in the background task contract the GUI layer consumes.

pub mod orchestrator;
pub mod pagination;
pub mod runner;

// Re-export the engine surface
pub use orchestrator::CrawlOrchestrator;
pub use pagination::{PaginationController, PaginationPhase, TraversalOutcome};
pub use runner::{CrawlTaskHandle, CrawlTaskRunner};
