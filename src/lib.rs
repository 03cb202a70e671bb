//! # Freshet
//!
//! A cached feed server for the YouTube Music home page. A headless browser
//! scrapes the personalized feed on a schedule; HTTP clients read the cached
//! result instantly instead of paying the scrape cost per request.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler ─┐
//!            ├─> RefreshCoordinator ─> FeedScraper ─> FeedStore
//! HTTP ──────┘                                           │
//!   └────────────────────── reads ───────────────────────┘
//! ```
//!
//! All refreshes funnel through the [`refresh::RefreshCoordinator`], which
//! guarantees at most one scrape runs at a time no matter how many routes
//! or timer ticks ask for one.

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/freshet/config.toml` (created with commented
/// defaults on first run) or an explicit `--config` path.
pub mod config;

/// Error taxonomy and crate-wide `Result`.
pub mod error;

/// Domain models: [`feed::Snapshot`], [`feed::Section`], [`feed::FeedItem`],
/// and the link classifier that turns raw hrefs into typed items.
pub mod feed;

/// Single-flight refresh coordination.
///
/// The heart of the crate: [`refresh::RefreshCoordinator`] owns the flight
/// lock and the cache, and exposes the three access contracts the HTTP
/// layer builds on (read-now, wait-for-fresh, fire-and-forget).
pub mod refresh;

/// Periodic refresh triggering.
pub mod scheduler;

/// Headless-browser scraping via chromiumoxide.
///
/// - [`scrape::FeedScraper`]: one browser launch per attempt
/// - [`scrape::PageDriver`]: the seam tests script against
/// - [`scrape::ScrapeConfig`]: URLs, caps, delays, profile directory
pub mod scrape;

/// HTTP surface built with axum.
pub mod server;

/// Cooperative shutdown signalling and process signal handling.
pub mod shutdown;

/// In-memory cache of the last successful snapshot.
pub mod store;
