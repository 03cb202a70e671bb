//! Single-flight refresh coordination.
//!
//! At most one scrape runs at any instant, enforced by one async mutex (the
//! flight lock). `Idle -> Refreshing` happens only through a non-blocking
//! `try_lock_owned`; the owned guard travels into the worker task and is
//! dropped unconditionally when the attempt ends, so the coordinator always
//! returns to idle and blocked callers always wake. The worker writes the
//! store before releasing, so a woken waiter reads exactly the refresh it
//! waited on.
//!
//! Three contracts on top of the cache:
//! - [`RefreshCoordinator::cached_now`]: stale-ok, never blocks.
//! - [`RefreshCoordinator::wait_for_fresh`]: wait for the in-flight refresh,
//!   optionally starting one when idle.
//! - [`RefreshCoordinator::trigger_refresh`]: fire-and-forget.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::error::FreshetError;
use crate::feed::Snapshot;
use crate::scrape::Scraper;
use crate::store::FeedStore;

/// What a refresh trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// A new scrape is now running in the background
    Started,
    /// Another refresh already held the flight lock
    AlreadyInProgress,
}

/// Owns the flight lock and the feed cache; one instance per process, shared
/// by the scheduler and every request handler.
pub struct RefreshCoordinator {
    scraper: Arc<dyn Scraper>,
    store: Mutex<FeedStore>,
    flight: Arc<AsyncMutex<()>>,
}

impl RefreshCoordinator {
    pub fn new(scraper: Arc<dyn Scraper>) -> Self {
        Self {
            scraper,
            store: Mutex::new(FeedStore::new()),
            flight: Arc::new(AsyncMutex::new(())),
        }
    }

    /// Current cache contents, immediately. Never blocks on a running
    /// refresh and never starts one.
    pub fn cached_now(&self) -> (Option<Arc<Snapshot>>, bool) {
        self.lock_store().read()
    }

    /// Attempt to start a background refresh without blocking.
    ///
    /// The flight lock is acquired before the worker is spawned, so two
    /// racing triggers can never both start a scrape.
    pub fn trigger_refresh(self: &Arc<Self>) -> RefreshOutcome {
        match self.flight.clone().try_lock_owned() {
            Ok(guard) => {
                let coordinator = Arc::clone(self);
                tokio::spawn(async move {
                    coordinator.run_refresh(guard).await;
                });
                RefreshOutcome::Started
            }
            Err(_) => RefreshOutcome::AlreadyInProgress,
        }
    }

    /// Return the cache once no refresh is in flight.
    ///
    /// With `trigger_if_idle`, an idle coordinator first starts a refresh
    /// (a racing `AlreadyInProgress` simply means there is a running one to
    /// wait for). Without it, an idle coordinator returns immediately: the
    /// cache is already the freshest available.
    pub async fn wait_for_fresh(
        self: &Arc<Self>,
        trigger_if_idle: bool,
    ) -> (Option<Arc<Snapshot>>, bool) {
        if trigger_if_idle {
            self.trigger_refresh();
        } else if self.flight.try_lock().is_ok() {
            return self.cached_now();
        }

        let guard = self.flight.lock().await;
        drop(guard);
        self.cached_now()
    }

    /// Worker body: runs the scrape, installs the result, releases the
    /// flight lock by dropping the guard. Failures stay inside this
    /// boundary; the cache is left untouched by anything but success.
    async fn run_refresh(&self, _flight: OwnedMutexGuard<()>) {
        info!("Refreshing feed...");
        let started = Instant::now();

        match self.scraper.scrape().await {
            Ok(snapshot) => {
                info!(
                    "Feed refresh completed: {} sections, {} items ({:.1}s)",
                    snapshot.sections.len(),
                    snapshot.item_count(),
                    started.elapsed().as_secs_f64()
                );
                self.lock_store().write(snapshot);
            }
            Err(FreshetError::Cancelled) => info!("Feed refresh cancelled"),
            Err(e) => warn!("Feed refresh failed: {}", e),
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, FeedStore> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
