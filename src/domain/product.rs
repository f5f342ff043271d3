//! Product record and crawl request/result types
//!
//! These are the only entities crossing the engine boundary. A
//! [`ProductRecord`] is immutable once built, a [`CrawlResult`] is immutable
//! once returned; nothing here is persisted by the engine itself.

use serde::{Deserialize, Serialize};

use crate::domain::errors::CrawlError;

/// Sentinel stored in [`ProductRecord::rating`] when no rating element exists.
pub const NO_RATING: &str = "no rating";

/// Fallback stored in [`ProductRecord::review_count`] when no count element exists.
pub const NO_REVIEWS: &str = "0";

/// One extracted search result from a listing page.
///
/// Invariant: a record is only ever constructed with both `name` and `link`
/// populated. Items missing either are dropped at extraction time, never
/// emitted with empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Display name of the product.
    pub name: String,
    /// Price text with thousands separators stripped. Kept as text because
    /// the site's formatting is locale specific and may carry suffixes.
    pub price: String,
    /// Rating text, or [`NO_RATING`] when the listing shows none.
    pub rating: String,
    /// Review count text with the enclosing parentheses stripped, or
    /// [`NO_REVIEWS`] when absent.
    #[serde(rename = "reviewCount")]
    pub review_count: String,
    /// Absolute URL of the product detail page.
    pub link: String,
}

/// One user-initiated search, validated at construction and immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRequest {
    keyword: String,
    max_items: usize,
}

impl CrawlRequest {
    /// Build a request from raw user input.
    ///
    /// The keyword is trimmed and must be non-empty; `max_items` must be
    /// greater than zero. Violations fail with
    /// [`CrawlError::InvalidRequest`] before any session is opened.
    pub fn new(keyword: &str, max_items: usize) -> Result<Self, CrawlError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(CrawlError::InvalidRequest(
                "search keyword must not be empty".to_string(),
            ));
        }
        if max_items == 0 {
            return Err(CrawlError::InvalidRequest(
                "max_items must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            keyword: keyword.to_string(),
            max_items,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Clamp the item budget to a ceiling, logging when the request exceeded it.
    pub fn clamped_to(mut self, ceiling: usize) -> Self {
        if self.max_items > ceiling {
            tracing::warn!(
                requested = self.max_items,
                ceiling,
                "Requested item count exceeds configured ceiling, clamping"
            );
            self.max_items = ceiling;
        }
        self
    }
}

/// Ordered collection of records produced by one crawl.
///
/// Records keep first-seen order across pages; the list is never re-sorted
/// and its length never exceeds the request's `max_items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    /// Extracted records in first-seen order.
    pub records: Vec<ProductRecord>,
    /// How many listing pages the traversal actually processed.
    #[serde(rename = "pagesVisited")]
    pub pages_visited: u32,
}

impl CrawlResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
