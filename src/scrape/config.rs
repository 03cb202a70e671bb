use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the home feed scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Feed page to scrape (default: https://music.youtube.com)
    pub feed_url: String,

    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Stop loading once this many sections are on the page and parse at most
    /// this many; 0 loads and parses everything (default: 10)
    pub row_cap: usize,

    /// Wait time after each scroll for new content in milliseconds (default: 500)
    pub scroll_delay_ms: u64,

    /// Bounded wait for navigations, scripts and browse resolution in seconds
    /// (default: 10)
    pub nav_timeout_secs: u64,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Browser profile directory holding the signed-in session; the anonymous
    /// feed is scraped when unset
    pub user_data_dir: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://music.youtube.com".to_string(),
            headless: true,
            row_cap: 10,
            scroll_delay_ms: 500,
            nav_timeout_secs: 10,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            user_data_dir: None,
        }
    }
}

impl ScrapeConfig {
    /// Get the effective row cap, `None` meaning uncapped
    pub fn cap(&self) -> Option<usize> {
        (self.row_cap > 0).then_some(self.row_cap)
    }

    /// Get the post-scroll wait as a Duration
    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    /// Get the per-operation bounded wait as a Duration
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }
}
