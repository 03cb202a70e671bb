use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::error::{FreshetError, Result};
use crate::scrape::config::ScrapeConfig;

/// How often the current URL is re-read while waiting for a redirect
const URL_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// The browser operations the scrape engine drives.
///
/// Kept deliberately small so tests can swap in a scripted fake. Every
/// operation is bounded: exceeding the configured wait fails with
/// [`FreshetError::TransientNetwork`].
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate the page and wait for the load to settle
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Evaluate a script expression and return its value (`null` for
    /// expressions that produce no value)
    async fn run_script(&self, js: &str) -> Result<serde_json::Value>;

    /// Full markup of the current document
    async fn document_markup(&self) -> Result<String>;

    /// Wait until the current URL contains `fragment`, or time out
    async fn wait_until_url_contains(&self, fragment: &str, wait: Duration) -> Result<()>;

    /// Tear the browser down; further calls are invalid
    async fn close(&mut self) -> Result<()>;
}

/// Chrome-based page driver using chromiumoxide
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    events: JoinHandle<()>,
    op_timeout: Duration,
}

impl ChromiumDriver {
    /// Launch a browser and open a blank page for the scrape to drive.
    pub async fn launch(config: &ScrapeConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref dir) = config.user_data_dir {
            builder = builder.user_data_dir(dir);
        }

        let browser_config = builder.build().map_err(|e| {
            FreshetError::TransientNetwork(format!("Failed to build browser config: {}", e))
        })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            FreshetError::TransientNetwork(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Spawn the browser event handler
        let events = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Handle browser events
            }
        });

        let page = browser.new_page("about:blank").await.map_err(|e| {
            FreshetError::TransientNetwork(format!("Failed to create page: {}", e))
        })?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua).await.map_err(|e| {
                FreshetError::TransientNetwork(format!("Failed to set user agent: {}", e))
            })?;
        }

        Ok(Self {
            browser,
            page,
            events,
            op_timeout: config.nav_timeout(),
        })
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        let load = async {
            self.page.goto(url).await.map_err(|e| {
                FreshetError::TransientNetwork(format!("Navigation to {} failed: {}", url, e))
            })?;
            self.page.wait_for_navigation().await.map_err(|e| {
                FreshetError::TransientNetwork(format!("Navigation to {} failed: {}", url, e))
            })?;
            Ok(())
        };

        timeout(self.op_timeout, load).await.map_err(|_| {
            FreshetError::TransientNetwork(format!("Navigation to {} timed out", url))
        })?
    }

    async fn run_script(&self, js: &str) -> Result<serde_json::Value> {
        let result = timeout(self.op_timeout, self.page.evaluate(js.to_string()))
            .await
            .map_err(|_| {
                FreshetError::TransientNetwork(format!("Script timed out: {}", js))
            })?
            .map_err(|e| {
                FreshetError::TransientNetwork(format!("Script execution failed: {}", e))
            })?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn document_markup(&self) -> Result<String> {
        timeout(self.op_timeout, self.page.content())
            .await
            .map_err(|_| {
                FreshetError::TransientNetwork("Reading page content timed out".to_string())
            })?
            .map_err(|e| {
                FreshetError::TransientNetwork(format!("Failed to read page content: {}", e))
            })
    }

    async fn wait_until_url_contains(&self, fragment: &str, wait: Duration) -> Result<()> {
        let poll = async {
            loop {
                let url = self.page.url().await.map_err(|e| {
                    FreshetError::TransientNetwork(format!("Failed to read page URL: {}", e))
                })?;
                if url.is_some_and(|u| u.contains(fragment)) {
                    return Ok(());
                }
                tokio::time::sleep(URL_POLL_INTERVAL).await;
            }
        };

        timeout(wait, poll).await.map_err(|_| {
            FreshetError::TransientNetwork(format!(
                "Timed out waiting for URL containing {:?}",
                fragment
            ))
        })?
    }

    async fn close(&mut self) -> Result<()> {
        self.browser.close().await.map_err(|e| {
            FreshetError::TransientNetwork(format!("Failed to close browser: {}", e))
        })?;

        // The event stream ends once the browser process is gone
        let _ = timeout(Duration::from_secs(2), &mut self.events).await;
        self.events.abort();
        Ok(())
    }
}
