//! Job-posting scraper: an escalating chain of fetch strategies feeding a
//! board-aware HTML normalizer.
//!
//! Strategies run sequentially, cheapest first, and the chain stops at the
//! first *complete* posting — a later, more expensive strategy is never
//! started once a usable result exists.

pub mod boards;
pub mod parse;
pub mod strategies;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

pub use boards::JobBoard;
pub use parse::JobPosting;
use strategies::{HeadlessBrowserStrategy, HttpStrategy, ScrapeStrategy, WebDriverStrategy};

/// Which fetch strategy produced a posting. Persisted with the analysis so
/// scrape regressions can be traced to a strategy after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScrapeMethod {
    Http,
    HeadlessBrowser,
    AutomatedBrowser,
}

impl ScrapeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeMethod::Http => "http",
            ScrapeMethod::HeadlessBrowser => "headless-browser",
            ScrapeMethod::AutomatedBrowser => "automated-browser",
        }
    }
}

impl std::fmt::Display for ScrapeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("All scraping strategies failed. Attempts => {}", attempts.join(" | "))]
    Exhausted { attempts: Vec<String> },
}

/// The scraper owns its strategy list, assembled once from config.
/// Disabled strategies are skipped at construction, not checked per call.
pub struct JobScraper {
    strategies: Vec<Box<dyn ScrapeStrategy>>,
}

impl JobScraper {
    pub fn from_config(config: &Config) -> Self {
        let mut strategies: Vec<Box<dyn ScrapeStrategy>> = vec![Box::new(HttpStrategy::new())];

        if config.enable_headless_fallback {
            strategies.push(Box::new(HeadlessBrowserStrategy));
        }
        if config.enable_webdriver_fallback {
            strategies.push(Box::new(WebDriverStrategy::new(
                config.webdriver_url.clone(),
                Duration::from_millis(config.webdriver_wait_ms),
            )));
        }

        Self { strategies }
    }

    /// Test seam: build a scraper over an arbitrary strategy list.
    pub fn with_strategies(strategies: Vec<Box<dyn ScrapeStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.method().as_str()).collect()
    }

    /// Fetches and normalizes a job posting, escalating through strategies
    /// until one yields a complete posting. Collects one failure reason per
    /// strategy for diagnostics when all of them come up short.
    pub async fn scrape(&self, url: &str) -> Result<JobPosting, ScrapeError> {
        let mut attempts = Vec::new();

        for strategy in &self.strategies {
            let method = strategy.method();
            match strategy.fetch(url).await {
                Ok(page) => {
                    let posting = parse::parse_job_html(&page.html, &page.final_url, method);
                    if posting.is_complete() {
                        info!(
                            "Scraped '{}' via {} ({} chars of description)",
                            posting.job_title,
                            method,
                            posting.job_description.len()
                        );
                        return Ok(posting);
                    }
                    warn!("{method} returned an incomplete posting for {url}");
                    attempts.push(format!("{method}: insufficient details"));
                }
                Err(e) => {
                    warn!("{method} failed for {url}: {e:#}");
                    attempts.push(format!("{method}: {e}"));
                }
            }
        }

        Err(ScrapeError::Exhausted { attempts })
    }
}
