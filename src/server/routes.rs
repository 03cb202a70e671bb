//! Route handlers.
//!
//! Feed routes differ only in how they treat the refresh cycle: `/feed`
//! serves the cache (waiting only when it is empty), `/feed/latest` waits
//! out any refresh in flight, `/feed/refreshed` forces one, `/feed/refresh`
//! kicks one off without waiting.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::feed::Snapshot;
use crate::refresh::RefreshOutcome;

use super::AppState;

pub async fn index() -> &'static str {
    "Hello World!"
}

#[derive(Serialize)]
pub struct StatusResponse {
    uptime: u64,
}

/// Uptime in whole seconds
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime: state.started_at.elapsed().as_secs(),
    })
}

/// Serve the cached snapshot. An empty cache waits out any refresh in
/// flight before answering.
pub async fn feed(State(state): State<AppState>) -> Json<Snapshot> {
    let (cached, has_value) = state.coordinator.cached_now();
    if has_value {
        return Json(snapshot_body(cached));
    }
    let (fresh, _) = state.coordinator.wait_for_fresh(false).await;
    Json(snapshot_body(fresh))
}

/// Wait for any in-flight refresh to settle, then serve the cache.
pub async fn feed_latest(State(state): State<AppState>) -> Json<Snapshot> {
    let (snapshot, _) = state.coordinator.wait_for_fresh(false).await;
    Json(snapshot_body(snapshot))
}

/// Force a refresh (or join the one in flight) and serve what it leaves
/// behind.
pub async fn feed_refreshed(State(state): State<AppState>) -> Json<Snapshot> {
    let (snapshot, _) = state.coordinator.wait_for_fresh(true).await;
    Json(snapshot_body(snapshot))
}

#[derive(Serialize)]
pub struct RefreshResponse {
    refresh: RefreshOutcome,
}

/// Kick off a refresh without waiting for it.
pub async fn feed_refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    Json(RefreshResponse {
        refresh: state.coordinator.trigger_refresh(),
    })
}

/// Stop with the exit code that asks the supervisor for a fresh process.
pub async fn restart(State(state): State<AppState>) -> &'static str {
    info!("Restart requested");
    state.shutdown.request_restart();
    "Restarting..."
}

pub async fn stop(State(state): State<AppState>) -> &'static str {
    info!("Stop requested");
    state.shutdown.request_stop();
    "Stopping..."
}

fn snapshot_body(snapshot: Option<Arc<Snapshot>>) -> Snapshot {
    snapshot.map(|s| (*s).clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use crate::feed::Section;
    use crate::refresh::RefreshCoordinator;
    use crate::scrape::Scraper;
    use crate::shutdown::Shutdown;

    struct FixedScraper {
        gate: Option<Arc<Semaphore>>,
        calls: AtomicUsize,
    }

    impl FixedScraper {
        fn open() -> Arc<Self> {
            Arc::new(Self {
                gate: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn gated(gate: Arc<Semaphore>) -> Arc<Self> {
            Arc::new(Self {
                gate: Some(gate),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Scraper for FixedScraper {
        async fn scrape(&self) -> crate::error::Result<Snapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ref gate) = self.gate {
                gate.acquire().await.unwrap().forget();
            }
            Ok(Snapshot::new(vec![Section {
                title: "Listen again".to_string(),
                subtitle: None,
                items: vec![],
            }]))
        }
    }

    fn test_state(scraper: Arc<FixedScraper>) -> AppState {
        AppState::new(
            Arc::new(RefreshCoordinator::new(scraper)),
            Shutdown::new(),
            "secret".to_string(),
        )
    }

    #[tokio::test]
    async fn test_index_says_hello() {
        assert_eq!(index().await, "Hello World!");
    }

    #[tokio::test]
    async fn test_status_reports_uptime() {
        let state = test_state(FixedScraper::open());
        let Json(body) = status(State(state)).await;
        assert!(body.uptime <= 1);
    }

    #[tokio::test]
    async fn test_feed_with_empty_cache_and_no_flight_serves_empty_array() {
        let scraper = FixedScraper::open();
        let state = test_state(scraper.clone());

        let Json(body) = feed(State(state)).await;
        assert!(body.sections.is_empty());
        assert_eq!(scraper.calls(), 0);
        assert_eq!(serde_json::to_value(&body).unwrap(), serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_feed_serves_cache_without_new_scrape() {
        let scraper = FixedScraper::open();
        let state = test_state(scraper.clone());
        state.coordinator.trigger_refresh();
        state.coordinator.wait_for_fresh(false).await;

        let Json(body) = feed(State(state)).await;
        assert_eq!(body.sections[0].title, "Listen again");
        assert_eq!(scraper.calls(), 1);
    }

    #[tokio::test]
    async fn test_feed_latest_waits_for_inflight_refresh() {
        let gate = Arc::new(Semaphore::new(0));
        let scraper = FixedScraper::gated(gate.clone());
        let state = test_state(scraper);
        state.coordinator.trigger_refresh();

        let waiter_state = state.clone();
        let waiter = tokio::spawn(async move { feed_latest(State(waiter_state)).await });
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        gate.add_permits(1);

        let Json(body) = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("feed_latest did not settle")
            .unwrap();
        assert_eq!(body.sections[0].title, "Listen again");
    }

    #[tokio::test]
    async fn test_feed_refreshed_triggers_when_idle() {
        let scraper = FixedScraper::open();
        let state = test_state(scraper.clone());

        let Json(body) = feed_refreshed(State(state)).await;
        assert_eq!(scraper.calls(), 1);
        assert_eq!(body.sections[0].title, "Listen again");
    }

    #[tokio::test]
    async fn test_feed_refresh_reports_flight_state() {
        let gate = Arc::new(Semaphore::new(0));
        let state = test_state(FixedScraper::gated(gate.clone()));

        let Json(first) = feed_refresh(State(state.clone())).await;
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::json!({"refresh": "started"})
        );

        let Json(second) = feed_refresh(State(state.clone())).await;
        assert_eq!(
            serde_json::to_value(&second).unwrap(),
            serde_json::json!({"refresh": "already_in_progress"})
        );

        gate.add_permits(1);
        state.coordinator.wait_for_fresh(false).await;
    }

    #[tokio::test]
    async fn test_restart_asks_supervisor_for_fresh_process() {
        let state = test_state(FixedScraper::open());
        assert_eq!(restart(State(state.clone())).await, "Restarting...");
        assert!(state.shutdown.is_stopping());
        assert!(state.shutdown.restart_requested());
    }

    #[tokio::test]
    async fn test_stop_shuts_down_without_restart() {
        let state = test_state(FixedScraper::open());
        assert_eq!(stop(State(state.clone())).await, "Stopping...");
        assert!(state.shutdown.is_stopping());
        assert!(!state.shutdown.restart_requested());
    }
}
