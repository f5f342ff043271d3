//! Browser session lifecycle and page-level operations
//!
//! One [`BrowserSession`] wraps one chromiumoxide (CDP) browser process with
//! the anti-detection and stability options the target site requires, plus
//! the page operations the pagination loop is built on: search navigation,
//! element-presence waits, next-control inspection and activation.
//!
//! Sessions are minted per crawl by [`ChromiumSessionProvider`] and are never
//! shared or reused; teardown is idempotent and happens on every exit path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::ClearBrowserCookiesParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::errors::{CrawlError, PageError};
use crate::domain::services::{NextControlState, SearchSession, SessionProvider};
use crate::infrastructure::config::CrawlerConfig;

/// How often element-presence polls re-check the page.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Marker class the listing puts on the next control once it is inert.
const DISABLED_CLASS: &str = "disabled";

/// Mints one exclusive chromiumoxide session per crawl.
pub struct ChromiumSessionProvider {
    config: Arc<CrawlerConfig>,
}

impl ChromiumSessionProvider {
    pub fn new(config: Arc<CrawlerConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for ChromiumSessionProvider {
    async fn open_session(&self) -> Result<Box<dyn SearchSession>, CrawlError> {
        let session = BrowserSession::open(Arc::clone(&self.config)).await?;
        Ok(Box::new(session))
    }
}

/// One live automated browser and its single search tab.
pub struct BrowserSession {
    config: Arc<CrawlerConfig>,
    browser: Option<Browser>,
    handler_task: Option<JoinHandle<()>>,
    page: Option<Page>,
}

impl BrowserSession {
    /// Launch a configured headless browser and open a blank tab.
    ///
    /// Fails with [`CrawlError::SessionInit`]; resources already acquired
    /// are released before the error propagates.
    pub async fn open(config: Arc<CrawlerConfig>) -> Result<Self, CrawlError> {
        let browser_config = build_browser_config(&config).map_err(CrawlError::SessionInit)?;

        info!(headless = config.browser.headless, "Launching browser session");
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CrawlError::SessionInit(e.to_string()))?;

        // Drive the CDP event stream for the lifetime of the session. Chrome
        // emits messages chromiumoxide does not model; only connection loss
        // ends the loop early.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let message = e.to_string();
                    if message.contains("connection closed")
                        || message.contains("websocket")
                        || message.contains("io error")
                    {
                        debug!("CDP connection ended: {message}");
                        break;
                    }
                    debug!("CDP event error (continuing): {message}");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // Partial failure: the process is up but unusable.
                let mut browser = browser;
                if let Err(close_err) = browser.close().await {
                    debug!("Browser close error during failed open (ignored): {close_err}");
                }
                handler_task.abort();
                return Err(CrawlError::SessionInit(e.to_string()));
            }
        };

        Ok(Self {
            config,
            browser: Some(browser),
            handler_task: Some(handler_task),
            page: Some(page),
        })
    }

    fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Sleep for one randomized pacing interval.
    async fn pace(&self) {
        let delay_ms = self.config.pacing.sample_ms();
        debug!(delay_ms, "Pacing before next action");
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    /// Poll for `selector` until it appears or `wait` elapses.
    async fn find_with_deadline(&self, selector: &str, wait: Duration) -> Option<Element> {
        let page = self.page()?;
        let deadline = tokio::time::Instant::now() + wait;

        loop {
            if let Ok(element) = page.find_element(selector).await {
                return Some(element);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl SearchSession for BrowserSession {
    async fn begin_search(&mut self, keyword: &str) -> Result<(), CrawlError> {
        let url = build_search_url(&self.config.search.endpoint, keyword)
            .map_err(|e| CrawlError::Navigation(format!("invalid search URL: {e}")))?;

        let Some(page) = self.page() else {
            return Err(CrawlError::Navigation("session already closed".to_string()));
        };

        // Drop cookies from any earlier navigation so searches never share
        // session state with each other.
        page.execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(|e| CrawlError::Navigation(format!("failed to clear cookies: {e}")))?;

        let load_timeout = Duration::from_secs(self.config.browser.page_load_timeout_secs);
        info!(%url, "Navigating to search results");

        let navigation = tokio::time::timeout(load_timeout, async {
            page.goto(url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        })
        .await;

        match navigation {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(CrawlError::Navigation(e.to_string())),
            Err(_) => {
                return Err(CrawlError::Navigation(format!(
                    "search page did not load within {}s",
                    load_timeout.as_secs()
                )));
            }
        }

        self.pace().await;
        Ok(())
    }

    async fn wait_for_items(&mut self) -> Result<(), PageError> {
        let wait = Duration::from_secs(self.config.browser.element_wait_timeout_secs);
        let selector = self.config.selectors.product_item.clone();

        match self.find_with_deadline(&selector, wait).await {
            Some(_) => Ok(()),
            None => Err(PageError::ItemWaitTimeout {
                waited_ms: wait.as_millis() as u64,
            }),
        }
    }

    async fn listing_html(&mut self) -> Result<String, PageError> {
        let Some(page) = self.page() else {
            return Err(PageError::Content("session already closed".to_string()));
        };
        page.content()
            .await
            .map_err(|e| PageError::Content(e.to_string()))
    }

    async fn next_control(&mut self) -> NextControlState {
        let wait = Duration::from_secs(self.config.browser.next_control_wait_secs);
        let selector = self.config.selectors.next_button.clone();

        let Some(control) = self.find_with_deadline(&selector, wait).await else {
            return NextControlState::Absent;
        };

        match control.attribute("class").await {
            Ok(Some(class)) if class.contains(DISABLED_CLASS) => NextControlState::Disabled,
            Ok(_) => NextControlState::Available,
            Err(e) => {
                // Stale handle between find and attribute read; the control
                // cannot be trusted, so pagination stops here.
                warn!("Next-page control became unreadable: {e}");
                NextControlState::Absent
            }
        }
    }

    async fn advance_to_next_page(&mut self) -> Result<(), PageError> {
        let selector = self.config.selectors.next_button.clone();
        let Some(page) = self.page() else {
            return Err(PageError::NextControl("session already closed".to_string()));
        };

        let control = page
            .find_element(selector.as_str())
            .await
            .map_err(|e| PageError::NextControl(e.to_string()))?;

        control
            .click()
            .await
            .map_err(|e| PageError::NextControl(e.to_string()))?;

        self.pace().await;
        Ok(())
    }

    async fn close(&mut self) {
        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                debug!("Browser close error (ignored): {e}");
            }
            let _ = browser.wait().await;
            info!("Browser session closed");
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

/// Launch options for the listing crawl.
///
/// Stealth and stability flags mirror what the target site tolerates:
/// automation-control detection off, certificate errors ignored, extensions
/// disabled, fixed realistic user agent.
fn build_browser_config(config: &CrawlerConfig) -> Result<BrowserConfig, String> {
    let browser = &config.browser;

    let mut builder = BrowserConfig::builder()
        .window_size(browser.window_width, browser.window_height)
        .request_timeout(Duration::from_secs(browser.page_load_timeout_secs))
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg("--ignore-certificate-errors")
        .arg("--disable-extensions")
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg(format!("--user-agent={}", config.search.user_agent));

    if !browser.headless {
        builder = builder.with_head();
    }
    if let Some(ref executable) = browser.chrome_executable {
        builder = builder.chrome_executable(executable);
    }
    for extra in &browser.extra_args {
        builder = builder.arg(extra.as_str());
    }

    builder.build()
}

/// Search URL for one keyword, with the query parameters the site's SRP
/// expects.
fn build_search_url(endpoint: &str, keyword: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        endpoint,
        &[
            ("q", keyword),
            ("channel", "user"),
            ("component", ""),
            ("eventCategory", "SRP"),
        ],
    )
}
