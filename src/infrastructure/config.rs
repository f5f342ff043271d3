//! Configuration infrastructure
//!
//! Contains configuration for the Coupang search crawl: endpoint, browser
//! options, pacing, traversal limits, and the CSS selectors the listing
//! markup is keyed on. Defaults reproduce the production values; everything
//! is serde-backed so a deployment can override any tier from a JSON file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Complete crawler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Search endpoint and identity settings
    pub search: SearchConfig,

    /// Browser launch and timeout settings
    pub browser: BrowserOptions,

    /// Randomized pacing between navigations
    pub pacing: PacingConfig,

    /// Item/page bounds for one crawl
    pub limits: LimitConfig,

    /// CSS selectors for the listing markup
    pub selectors: SelectorConfig,
}

/// Search endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint URL without query parameters
    pub endpoint: String,

    /// Base URL relative detail links are resolved against
    pub base_url: String,

    /// Fixed realistic user agent sent by the browser
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.coupang.com/np/search".to_string(),
            base_url: "https://www.coupang.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Browser launch and timeout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Run the browser headless
    pub headless: bool,

    /// Fixed viewport size
    pub window_width: u32,
    pub window_height: u32,

    /// Page load timeout in seconds
    pub page_load_timeout_secs: u64,

    /// Wait window for result items to appear, in seconds
    pub element_wait_timeout_secs: u64,

    /// Wait window for the next-page control, in seconds
    pub next_control_wait_secs: u64,

    /// Extra Chrome flags appended after the built-in set
    pub extra_args: Vec<String>,

    /// Explicit Chrome executable path; autodetected when unset
    pub chrome_executable: Option<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            page_load_timeout_secs: 30,
            element_wait_timeout_secs: 10,
            next_control_wait_secs: 5,
            extra_args: Vec::new(),
            chrome_executable: None,
        }
    }
}

/// Randomized pacing window applied between navigations.
///
/// Uniform in `[min_ms, max_ms]`; keeps the crawl's request rate below the
/// target site's rate defenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_ms: 2000,
            max_ms: 3000,
        }
    }
}

impl PacingConfig {
    /// Sample one pacing delay from the configured window.
    pub fn sample_ms(&self) -> u64 {
        if self.min_ms >= self.max_ms {
            return self.min_ms;
        }
        fastrand::u64(self.min_ms..=self.max_ms)
    }
}

/// Item and page bounds for one crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Hard page cap per crawl (페이지 범위 제한)
    pub max_pages: u32,

    /// Item budget used when the caller does not supply one
    pub default_max_items: usize,

    /// Ceiling applied to caller-supplied item budgets
    pub max_items_ceiling: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_pages: 5,
            default_max_items: 10,
            max_items_ceiling: 100,
        }
    }
}

/// CSS selectors for the Coupang search listing markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// One search result item
    pub product_item: String,
    /// Product display name inside an item
    pub name: String,
    /// Price value inside an item
    pub price: String,
    /// Rating text inside an item; often absent
    pub rating: String,
    /// Review count inside an item; often absent
    pub review_count: String,
    /// Detail page link inside an item
    pub link: String,
    /// Next-page control on the listing page
    pub next_button: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            product_item: "li.search-product".to_string(),
            name: ".name".to_string(),
            price: ".price-value".to_string(),
            rating: ".rating".to_string(),
            review_count: ".rating-total-count".to_string(),
            link: "a.search-product-link".to_string(),
            next_button: "a.btn-next".to_string(),
        }
    }
}

impl CrawlerConfig {
    /// Load configuration from a JSON file.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded crawler configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a JSON file (pretty-printed).
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!("Saved crawler configuration to {}", path.display());
        Ok(())
    }
}
