//! Periodic refresh triggering.
//!
//! Fires `trigger_refresh` on a fixed interval, independent of
//! caller-triggered refreshes. A tick that lands while a refresh is already
//! in flight is skipped; the flight lock makes doubling up impossible.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, info};

use crate::error::{FreshetError, Result};
use crate::refresh::{RefreshCoordinator, RefreshOutcome};
use crate::shutdown::Shutdown;

/// Parse an interval string like "6h", "30m", "1d"
pub fn parse_interval(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let secs = if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .map(|h| h * 3600)
            .map_err(|_| FreshetError::Config(format!("Invalid hours: {}", hours)))?
    } else if let Some(minutes) = s.strip_suffix('m') {
        minutes
            .parse::<u64>()
            .map(|m| m * 60)
            .map_err(|_| FreshetError::Config(format!("Invalid minutes: {}", minutes)))?
    } else if let Some(days) = s.strip_suffix('d') {
        days.parse::<u64>()
            .map(|d| d * 86400)
            .map_err(|_| FreshetError::Config(format!("Invalid days: {}", days)))?
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>()
            .map_err(|_| FreshetError::Config(format!("Invalid seconds: {}", secs)))?
    } else {
        // Try parsing as raw seconds
        s.parse::<u64>().map_err(|_| {
            FreshetError::Config(format!(
                "Invalid interval: {}. Use format like '6h', '30m', '1d'",
                s
            ))
        })?
    };

    if secs == 0 {
        return Err(FreshetError::Config(
            "Refresh interval must be positive".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Format an interval for display
pub fn format_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Periodic refresh driver
pub struct Scheduler {
    coordinator: Arc<RefreshCoordinator>,
    interval: Duration,
    refresh_on_start: bool,
    shutdown: Shutdown,
}

impl Scheduler {
    pub fn new(
        coordinator: Arc<RefreshCoordinator>,
        interval: Duration,
        refresh_on_start: bool,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            coordinator,
            interval,
            refresh_on_start,
            shutdown,
        }
    }

    /// Run until shutdown is requested.
    pub async fn run(self) {
        info!(
            "Refresh scheduler started (interval: {})",
            format_interval(self.interval)
        );

        if self.refresh_on_start {
            info!("Running initial feed refresh...");
            self.coordinator.trigger_refresh();
        }

        let mut timer = interval(self.interval);
        timer.tick().await; // Skip the first immediate tick

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = self.shutdown.wait() => break,
            }

            match self.coordinator.trigger_refresh() {
                RefreshOutcome::Started => info!("Running scheduled feed refresh..."),
                RefreshOutcome::AlreadyInProgress => {
                    debug!("Refresh already in flight, skipping scheduled tick");
                }
            }
        }

        debug!("Refresh scheduler stopped");
    }
}
