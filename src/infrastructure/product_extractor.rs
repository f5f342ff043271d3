//! Product record extraction from rendered listing pages
//!
//! Robust per-item extraction with an explicit field policy: required fields
//! (name, price, link) drop the whole item when absent, optional fields
//! (rating, review count) substitute documented defaults. One bad item never
//! aborts the page or the crawl.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::domain::product::{NO_RATING, NO_REVIEWS, ProductRecord};
use crate::infrastructure::config::SelectorConfig;

/// Why a single listing item produced no record.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[error("item has no product name")]
    MissingName,

    /// A priceless record is not actionable for the caller, so a missing
    /// price drops the item rather than defaulting.
    #[error("item has no price value")]
    MissingPrice,

    #[error("item has no resolvable detail link")]
    MissingLink,
}

/// Outcome of extracting one listing item.
///
/// The value-or-fallback vs. skip-item distinction is a visible contract
/// here, not a side effect of exception handling.
#[derive(Debug, Clone)]
pub enum ExtractOutcome {
    Extracted(ProductRecord),
    Skipped(SkipReason),
}

/// What one listing page yielded.
#[derive(Debug, Clone, Default)]
pub struct ListingExtraction {
    /// Records in document order, at most the requested capacity.
    pub records: Vec<ProductRecord>,
    /// Item elements enumerated before capacity was reached.
    pub items_seen: usize,
    /// Items dropped for a missing required field.
    pub items_skipped: usize,
}

/// Extractor for Coupang search listing pages.
///
/// Selectors are compiled once at construction; an invalid selector is a
/// configuration bug and fails fast.
pub struct ProductExtractor {
    item_selector: Selector,
    name_selector: Selector,
    price_selector: Selector,
    rating_selector: Selector,
    review_count_selector: Selector,
    link_selector: Selector,
    base_url: Url,
}

impl ProductExtractor {
    /// Create an extractor from selector configuration and the base URL
    /// relative detail links resolve against.
    pub fn new(selectors: &SelectorConfig, base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            item_selector: compile(&selectors.product_item)?,
            name_selector: compile(&selectors.name)?,
            price_selector: compile(&selectors.price)?,
            rating_selector: compile(&selectors.rating)?,
            review_count_selector: compile(&selectors.review_count)?,
            link_selector: compile(&selectors.link)?,
            base_url: Url::parse(base_url)
                .map_err(|e| anyhow::anyhow!("Invalid base URL '{base_url}': {e}"))?,
        })
    }

    /// Extract up to `capacity` records from one rendered listing page,
    /// in document order.
    pub fn extract_listing(&self, html: &str, capacity: usize) -> ListingExtraction {
        let document = Html::parse_document(html);
        let mut extraction = ListingExtraction::default();

        for element in document.select(&self.item_selector) {
            if extraction.records.len() >= capacity {
                break;
            }
            extraction.items_seen += 1;

            match self.extract_item(element) {
                ExtractOutcome::Extracted(record) => extraction.records.push(record),
                ExtractOutcome::Skipped(reason) => {
                    extraction.items_skipped += 1;
                    debug!(item = extraction.items_seen, %reason, "Skipping listing item");
                }
            }
        }

        debug!(
            collected = extraction.records.len(),
            skipped = extraction.items_skipped,
            "Listing extraction finished"
        );
        extraction
    }

    /// Convert one item element into zero or one record.
    fn extract_item(&self, element: ElementRef<'_>) -> ExtractOutcome {
        let Some(name) = self.text_of(element, &self.name_selector) else {
            return ExtractOutcome::Skipped(SkipReason::MissingName);
        };

        let Some(price) = self.text_of(element, &self.price_selector) else {
            return ExtractOutcome::Skipped(SkipReason::MissingPrice);
        };
        // 천 단위 구분자 제거 (locale-specific grouping separator)
        let price = price.replace(',', "");

        let rating = self
            .text_of(element, &self.rating_selector)
            .unwrap_or_else(|| NO_RATING.to_string());

        let review_count = self
            .text_of(element, &self.review_count_selector)
            .map(|raw| strip_parentheses(&raw))
            .unwrap_or_else(|| NO_REVIEWS.to_string());

        let Some(link) = self.detail_link(element) else {
            return ExtractOutcome::Skipped(SkipReason::MissingLink);
        };

        ExtractOutcome::Extracted(ProductRecord {
            name,
            price,
            rating,
            review_count,
            link,
        })
    }

    /// First non-empty text match under `element`, whitespace-normalized.
    fn text_of(&self, element: ElementRef<'_>, selector: &Selector) -> Option<String> {
        element.select(selector).find_map(|matched| {
            let text = matched
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            (!text.is_empty()).then_some(text)
        })
    }

    /// Absolute detail-page URL, resolving relative hrefs against the base.
    fn detail_link(&self, element: ElementRef<'_>) -> Option<String> {
        let href = element
            .select(&self.link_selector)
            .find_map(|anchor| anchor.value().attr("href"))?;

        match Url::parse(href) {
            Ok(absolute) => Some(absolute.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => match self.base_url.join(href) {
                Ok(resolved) => Some(resolved.to_string()),
                Err(e) => {
                    warn!(href, error = %e, "Detail link did not resolve against base URL");
                    None
                }
            },
            Err(e) => {
                warn!(href, error = %e, "Detail link is not a valid URL");
                None
            }
        }
    }
}

fn compile(selector: &str) -> anyhow::Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("Invalid CSS selector '{selector}': {e}"))
}

/// Strip one enclosing parenthesis pair, as the listing renders review
/// counts like `(1,024)`.
fn strip_parentheses(raw: &str) -> String {
    let stripped = raw.strip_prefix('(').unwrap_or(raw);
    let stripped = stripped.strip_suffix(')').unwrap_or(stripped);
    stripped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::SelectorConfig;

    fn extractor() -> ProductExtractor {
        ProductExtractor::new(&SelectorConfig::default(), "https://www.coupang.com").unwrap()
    }

    fn item(name: &str, price: &str, rating: &str, reviews: &str, href: &str) -> String {
        let name_div = if name.is_empty() {
            String::new()
        } else {
            format!(r#"<div class="name">{name}</div>"#)
        };
        let price_span = if price.is_empty() {
            String::new()
        } else {
            format!(r#"<strong class="price-value">{price}</strong>"#)
        };
        let rating_em = if rating.is_empty() {
            String::new()
        } else {
            format!(r#"<em class="rating">{rating}</em>"#)
        };
        let review_span = if reviews.is_empty() {
            String::new()
        } else {
            format!(r#"<span class="rating-total-count">{reviews}</span>"#)
        };
        let anchor = if href.is_empty() {
            format!(r#"<span>{name_div}{price_span}{rating_em}{review_span}</span>"#)
        } else {
            format!(
                r#"<a class="search-product-link" href="{href}">{name_div}{price_span}{rating_em}{review_span}</a>"#
            )
        };
        format!(r#"<li class="search-product">{anchor}</li>"#)
    }

    fn listing(items: &[String]) -> String {
        format!(r#"<html><body><ul id="productList">{}</ul></body></html>"#, items.join(""))
    }

    #[test]
    fn extracts_a_complete_item() {
        let html = listing(&[item(
            "무선 키보드",
            "32,900",
            "4.5",
            "(1,203)",
            "/vp/products/123",
        )]);
        let extraction = extractor().extract_listing(&html, 10);

        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[0];
        assert_eq!(record.name, "무선 키보드");
        assert_eq!(record.price, "32900");
        assert_eq!(record.rating, "4.5");
        assert_eq!(record.review_count, "1,203");
        assert_eq!(record.link, "https://www.coupang.com/vp/products/123");
    }

    #[test]
    fn price_never_keeps_grouping_separators() {
        let html = listing(&[item("TV", "1,234,567", "5.0", "(9)", "/vp/products/9")]);
        let extraction = extractor().extract_listing(&html, 10);
        assert_eq!(extraction.records[0].price, "1234567");
        assert!(!extraction.records[0].price.contains(','));
    }

    #[test]
    fn missing_rating_uses_sentinel() {
        let html = listing(&[item("의자", "89,000", "", "(12)", "/vp/products/2")]);
        let extraction = extractor().extract_listing(&html, 10);
        assert_eq!(extraction.records[0].rating, NO_RATING);
        assert_eq!(extraction.records[0].review_count, "12");
    }

    #[test]
    fn missing_review_count_defaults_to_zero() {
        let html = listing(&[item("의자", "89,000", "4.0", "", "/vp/products/2")]);
        let extraction = extractor().extract_listing(&html, 10);
        assert_eq!(extraction.records[0].review_count, NO_REVIEWS);
    }

    #[test]
    fn item_without_name_is_skipped() {
        let html = listing(&[
            item("", "10,000", "4.0", "(3)", "/vp/products/1"),
            item("모니터", "199,000", "4.8", "(41)", "/vp/products/2"),
        ]);
        let extraction = extractor().extract_listing(&html, 10);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].name, "모니터");
        assert_eq!(extraction.items_skipped, 1);
    }

    #[test]
    fn item_without_price_is_skipped() {
        let html = listing(&[item("모니터", "", "4.8", "(41)", "/vp/products/2")]);
        let extraction = extractor().extract_listing(&html, 10);
        assert!(extraction.records.is_empty());
        assert_eq!(extraction.items_skipped, 1);
    }

    #[test]
    fn item_without_link_is_skipped_and_crawl_continues() {
        let html = listing(&[
            item("책상", "120,000", "4.2", "(7)", ""),
            item("모니터", "199,000", "4.8", "(41)", "/vp/products/2"),
        ]);
        let extraction = extractor().extract_listing(&html, 10);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].name, "모니터");
    }

    #[test]
    fn no_record_ever_has_empty_name_or_link() {
        let html = listing(&[
            item("", "", "", "", ""),
            item("A", "1,000", "", "", "/vp/products/1"),
            item("B", "2,000", "3.5", "(2)", "https://www.coupang.com/vp/products/2"),
        ]);
        let extraction = extractor().extract_listing(&html, 10);
        for record in &extraction.records {
            assert!(!record.name.is_empty());
            assert!(!record.link.is_empty());
        }
    }

    #[test]
    fn absolute_links_pass_through_unchanged() {
        let html = listing(&[item(
            "A",
            "1,000",
            "4.0",
            "(1)",
            "https://www.coupang.com/vp/products/77?itemId=3",
        )]);
        let extraction = extractor().extract_listing(&html, 10);
        assert_eq!(
            extraction.records[0].link,
            "https://www.coupang.com/vp/products/77?itemId=3"
        );
    }

    #[test]
    fn capacity_bounds_extraction_in_document_order() {
        let items: Vec<String> = (0..8)
            .map(|i| {
                item(
                    &format!("상품 {i}"),
                    "5,000",
                    "4.0",
                    "(1)",
                    &format!("/vp/products/{i}"),
                )
            })
            .collect();
        let html = listing(&items);

        let extraction = extractor().extract_listing(&html, 3);
        assert_eq!(extraction.records.len(), 3);
        assert_eq!(extraction.records[0].name, "상품 0");
        assert_eq!(extraction.records[2].name, "상품 2");
    }

    #[test]
    fn extraction_order_is_stable_across_runs() {
        let items: Vec<String> = (0..5)
            .map(|i| {
                item(
                    &format!("상품 {i}"),
                    "5,000",
                    "4.0",
                    "(1)",
                    &format!("/vp/products/{i}"),
                )
            })
            .collect();
        let html = listing(&items);

        let first = extractor().extract_listing(&html, 10).records;
        let second = extractor().extract_listing(&html, 10).records;
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_selector_fails_construction() {
        let mut selectors = SelectorConfig::default();
        selectors.product_item = ":::not-a-selector".to_string();
        assert!(ProductExtractor::new(&selectors, "https://www.coupang.com").is_err());
    }
}
