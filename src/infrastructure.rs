//! Infrastructure layer for browser automation, extraction, and configuration
//!
//! This module provides the chromiumoxide session implementation, the
//! scraper-based record extractor, configuration, and logging setup behind
//! the domain's service seams.

pub mod browser_session; // chromiumoxide session + provider
pub mod config; // Configuration structures and file helpers
pub mod logging; // Logging infrastructure
pub mod product_extractor; // Listing-page record extraction

// Re-export commonly used items
pub use browser_session::{BrowserSession, ChromiumSessionProvider};
pub use config::{CrawlerConfig, SelectorConfig};
pub use logging::{get_log_directory, init_logging, init_logging_with_file};
pub use product_extractor::{ExtractOutcome, ListingExtraction, ProductExtractor, SkipReason};
