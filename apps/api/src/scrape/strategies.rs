//! Fetch strategies for job-posting pages, cheapest first.
//!
//! Each strategy bounds its own time and releases any browser/driver
//! resource on every exit path; a leaked Chrome process under sustained
//! load is an outage, not an inconvenience.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use fantoccini::ClientBuilder;
use headless_chrome::{Browser, LaunchOptions};

use super::ScrapeMethod;

/// Desktop browser user agent; job boards block obvious bot agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";

const HTTP_TIMEOUT_SECS: u64 = 15;
const NAVIGATION_TIMEOUT_SECS: u64 = 30;
/// Settle delay after navigation so client-rendered boards finish painting.
const HEADLESS_SETTLE_MS: u64 = 2000;

/// Raw fetched page plus the URL the fetch actually landed on, which is
/// what board detection must run against after redirects.
pub struct FetchedPage {
    pub html: String,
    pub final_url: String,
}

/// One way of turning a URL into HTML. Strategies are assembled into an
/// ordered list at startup from config; disabled ones are never constructed.
#[async_trait]
pub trait ScrapeStrategy: Send + Sync {
    fn method(&self) -> ScrapeMethod;
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy 1: plain HTTP fetch
// ────────────────────────────────────────────────────────────────────────────

pub struct HttpStrategy {
    client: reqwest::Client,
}

impl HttpStrategy {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl ScrapeStrategy for HttpStrategy {
    fn method(&self) -> ScrapeMethod {
        ScrapeMethod::Http
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .context("request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("http status {}", status.as_u16());
        }

        let final_url = response.url().to_string();
        let html = response.text().await.context("failed to read body")?;
        Ok(FetchedPage { html, final_url })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy 2: headless Chrome render
// ────────────────────────────────────────────────────────────────────────────

pub struct HeadlessBrowserStrategy;

#[async_trait]
impl ScrapeStrategy for HeadlessBrowserStrategy {
    fn method(&self) -> ScrapeMethod {
        ScrapeMethod::HeadlessBrowser
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let url = url.to_string();
        // headless_chrome is synchronous; keep it off the async executor.
        // The Browser handle drops (killing the process) on every path out
        // of the closure, including errors.
        tokio::task::spawn_blocking(move || -> Result<FetchedPage> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .idle_browser_timeout(Duration::from_secs(NAVIGATION_TIMEOUT_SECS * 2))
                .build()
                .map_err(|e| anyhow!("launch options: {e}"))?;

            let browser = Browser::new(options).context("failed to launch browser")?;
            let tab = browser.new_tab().context("failed to open tab")?;
            tab.set_default_timeout(Duration::from_secs(NAVIGATION_TIMEOUT_SECS));
            tab.set_user_agent(USER_AGENT, None, None)
                .context("failed to set user agent")?;

            tab.navigate_to(&url).context("navigation failed")?;
            tab.wait_until_navigated().context("page never settled")?;
            std::thread::sleep(Duration::from_millis(HEADLESS_SETTLE_MS));

            let html = tab.get_content().context("failed to read page content")?;
            let final_url = tab.get_url();
            Ok(FetchedPage { html, final_url })
        })
        .await
        .map_err(|e| anyhow!("browser task panicked: {e}"))?
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy 3: WebDriver automation
// ────────────────────────────────────────────────────────────────────────────

pub struct WebDriverStrategy {
    webdriver_url: String,
    settle: Duration,
}

impl WebDriverStrategy {
    pub fn new(webdriver_url: String, settle: Duration) -> Self {
        Self {
            webdriver_url,
            settle,
        }
    }

    async fn drive(client: &mut fantoccini::Client, url: &str, settle: Duration) -> Result<FetchedPage> {
        client.goto(url).await.context("navigation failed")?;
        tokio::time::sleep(settle).await;
        let html = client.source().await.context("failed to read page source")?;
        let final_url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        Ok(FetchedPage { html, final_url })
    }
}

#[async_trait]
impl ScrapeStrategy for WebDriverStrategy {
    fn method(&self) -> ScrapeMethod {
        ScrapeMethod::AutomatedBrowser
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let mut client = ClientBuilder::native()
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| anyhow!("webdriver session: {e}"))?;

        // The session closes whether or not navigation succeeded.
        let result = Self::drive(&mut client, url, self.settle).await;
        if let Err(e) = client.close().await {
            tracing::warn!("Failed to close webdriver session: {e}");
        }
        result
    }
}
