//! Headless-browser scraping of the home feed.
//!
//! One scrape attempt drives a fresh browser through:
//!
//! ```text
//! navigate → load more (scroll/wait/measure) → parse document → resolve browse refs
//! ```
//!
//! The incremental-load loop ends on the first of three conditions: the page
//! extent stops growing, the configured row cap is reached, or shutdown is
//! requested. A cancelled attempt produces no snapshot at all; partial
//! results are never returned.

mod config;
mod driver;
mod parse;

pub use config::ScrapeConfig;
pub use driver::{ChromiumDriver, PageDriver};

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FreshetError, Result};
use crate::feed::{FeedItem, LinkRef, Section, Snapshot};
use crate::shutdown::Shutdown;

const PAGE_EXTENT_JS: &str = "document.body.scrollHeight";
const LOAD_MORE_JS: &str = "window.scrollTo(0, document.body.scrollHeight)";
const SECTION_COUNT_JS: &str =
    "(function() { const c = document.getElementById('contents'); return c ? c.children.length : 0; })()";
const CURRENT_URL_JS: &str = "window.location.href";

/// Why the incremental-load loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEnd {
    /// The page extent did not grow between consecutive scrolls
    ExtentStable,
    /// The configured number of sections is on the page
    RowCapReached,
    /// Shutdown was requested mid-load
    Cancelled,
}

/// Trait for snapshot-producing scrape implementations
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Produce one complete feed snapshot
    async fn scrape(&self) -> Result<Snapshot>;
}

/// Home feed scraper that launches a fresh browser per attempt
pub struct FeedScraper {
    config: ScrapeConfig,
    shutdown: Shutdown,
}

impl FeedScraper {
    pub fn new(config: ScrapeConfig, shutdown: Shutdown) -> Self {
        Self { config, shutdown }
    }

    /// Drive the load loop until one of the three exit conditions holds.
    async fn load_feed(&self, driver: &dyn PageDriver) -> Result<LoadEnd> {
        let cap = self.config.cap();
        let mut prev_extent = self.page_extent(driver).await?;

        loop {
            if self.shutdown.is_stopping() {
                return Ok(LoadEnd::Cancelled);
            }

            if let Some(cap) = cap {
                if self.section_count(driver).await? >= cap {
                    return Ok(LoadEnd::RowCapReached);
                }
            }

            driver.run_script(LOAD_MORE_JS).await?;
            tokio::time::sleep(self.config.scroll_delay()).await;

            let extent = self.page_extent(driver).await?;
            if extent == prev_extent {
                return Ok(LoadEnd::ExtentStable);
            }
            prev_extent = extent;
        }
    }

    /// Run one attempt against an already-launched driver.
    async fn scrape_with(&self, driver: &dyn PageDriver) -> Result<Snapshot> {
        driver.navigate(&self.config.feed_url).await?;

        match self.load_feed(driver).await? {
            LoadEnd::Cancelled => return Err(FreshetError::Cancelled),
            end => debug!("Feed loading finished: {:?}", end),
        }

        let markup = driver.document_markup().await?;
        let raw_sections = parse::parse_sections(&markup, self.config.cap())?;

        let mut sections = Vec::with_capacity(raw_sections.len());
        for raw in raw_sections {
            let mut items = Vec::with_capacity(raw.links.len());
            for link in raw.links {
                items.push(self.finalize_item(driver, link).await?);
            }
            sections.push(Section {
                title: raw.title,
                subtitle: raw.subtitle,
                items,
            });
        }

        Ok(Snapshot::new(sections))
    }

    async fn finalize_item(&self, driver: &dyn PageDriver, link: LinkRef) -> Result<FeedItem> {
        Ok(match link {
            LinkRef::Artist { channel_id } => FeedItem::Artist { id: channel_id },
            LinkRef::Song {
                video_id,
                playlist_id,
            } => FeedItem::Song {
                id: video_id,
                playlist_id,
            },
            LinkRef::Playlist { playlist_id } => FeedItem::Playlist { id: playlist_id },
            LinkRef::Browse { browse_id } => {
                if self.shutdown.is_stopping() {
                    return Err(FreshetError::Cancelled);
                }
                let id = self.resolve_browse(driver, &browse_id).await?;
                FeedItem::Playlist { id }
            }
        })
    }

    /// Resolve an indirect playlist reference by navigating to its browse
    /// page and reading the playlist id off the URL the page redirects to.
    async fn resolve_browse(&self, driver: &dyn PageDriver, browse_id: &str) -> Result<String> {
        let url = format!(
            "{}/browse/{}",
            self.config.feed_url.trim_end_matches('/'),
            browse_id
        );
        driver.navigate(&url).await?;
        driver
            .wait_until_url_contains("playlist?list=", self.config.nav_timeout())
            .await?;

        let value = driver.run_script(CURRENT_URL_JS).await?;
        let Some(current) = value.as_str() else {
            return Err(FreshetError::ParseShape(format!(
                "Current URL query returned {}",
                value
            )));
        };
        playlist_id_from_url(current)
    }

    async fn page_extent(&self, driver: &dyn PageDriver) -> Result<i64> {
        let value = driver.run_script(PAGE_EXTENT_JS).await?;
        json_number(&value).ok_or_else(|| {
            FreshetError::ParseShape(format!("Page extent query returned {}", value))
        })
    }

    async fn section_count(&self, driver: &dyn PageDriver) -> Result<usize> {
        let value = driver.run_script(SECTION_COUNT_JS).await?;
        let count = json_number(&value).ok_or_else(|| {
            FreshetError::ParseShape(format!("Section count query returned {}", value))
        })?;
        Ok(count.max(0) as usize)
    }
}

#[async_trait]
impl Scraper for FeedScraper {
    async fn scrape(&self) -> Result<Snapshot> {
        if self.shutdown.is_stopping() {
            return Err(FreshetError::Cancelled);
        }

        let mut driver = ChromiumDriver::launch(&self.config).await?;
        let result = self.scrape_with(&driver).await;

        if let Err(e) = driver.close().await {
            warn!("Failed to close browser: {}", e);
        }
        result
    }
}

fn json_number(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

/// Pull the `list` query parameter out of a resolved playlist URL.
fn playlist_id_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| {
        FreshetError::ParseShape(format!("Unparseable playlist URL {:?}: {}", url, e))
    })?;
    parsed
        .query_pairs()
        .find(|(key, value)| key == "list" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| {
            FreshetError::ParseShape(format!("Resolved URL {:?} carries no playlist id", url))
        })
}
