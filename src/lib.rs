//! Coupang Crawler v2 - Browser-Driven Product Search Crawling Engine
//!
//! This crate is the paginated extraction core of a desktop product-crawling
//! tool: it drives one automated browser session across search result pages,
//! extracts per-item product records with independent failure tolerance, and
//! runs the whole crawl off the interactive thread with a single terminal
//! outcome per request.
//!
//! The GUI shell, spreadsheet wiring, and persistence live outside this
//! crate; the only contract they depend on is
//! [`CrawlTaskRunner::start_search`](crawl_engine::CrawlTaskRunner::start_search).
//!
//! ```no_run
//! use std::sync::Arc;
//! use coupang_crawler_v2::crawl_engine::CrawlTaskRunner;
//! use coupang_crawler_v2::infrastructure::CrawlerConfig;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let runner = CrawlTaskRunner::new(Arc::new(CrawlerConfig::default()))?;
//! let handle = runner.start_search("무선 키보드", 20)?;
//! let result = handle.outcome().await?;
//! println!("collected {} records", result.len());
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod application;
pub mod crawl_engine;
pub mod domain;
pub mod infrastructure;

// Re-export the consumer-facing surface
pub use crawl_engine::{CrawlOrchestrator, CrawlTaskHandle, CrawlTaskRunner};
pub use domain::{
    CrawlError, CrawlRequest, CrawlResult, CrawlStatus, ProductRecord, NO_RATING, NO_REVIEWS,
};
pub use infrastructure::CrawlerConfig;
