//! HTTP surface.
//!
//! Two public routes (`/` and `/status`); everything under `/feed` plus the
//! process-control routes sits behind the shared-secret `key` query
//! parameter and answers 401 without it.

mod auth;
mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::refresh::RefreshCoordinator;
use crate::shutdown::Shutdown;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<RefreshCoordinator>,
    pub shutdown: Shutdown,
    pub api_key: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(coordinator: Arc<RefreshCoordinator>, shutdown: Shutdown, api_key: String) -> Self {
        Self {
            coordinator,
            shutdown,
            api_key,
            started_at: Instant::now(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/feed", get(routes::feed))
        .route("/feed/latest", get(routes::feed_latest))
        .route("/feed/refreshed", get(routes::feed_refreshed))
        .route("/feed/refresh", get(routes::feed_refresh))
        .route("/restart", get(routes::restart))
        .route("/stop", get(routes::stop))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_key,
        ));

    Router::new()
        .route("/", get(routes::index))
        .route("/status", get(routes::status))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::feed::Snapshot;
    use crate::scrape::Scraper;

    const PROTECTED_ROUTES: [&str; 6] = [
        "/feed",
        "/feed/latest",
        "/feed/refreshed",
        "/feed/refresh",
        "/restart",
        "/stop",
    ];

    struct StubScraper;

    #[async_trait]
    impl Scraper for StubScraper {
        async fn scrape(&self) -> crate::error::Result<Snapshot> {
            Ok(Snapshot::default())
        }
    }

    fn test_app() -> Router {
        router(AppState::new(
            Arc::new(RefreshCoordinator::new(Arc::new(StubScraper))),
            Shutdown::new(),
            "secret".to_string(),
        ))
    }

    async fn get_status(app: &Router, uri: &str) -> StatusCode {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_protected_routes_reject_missing_and_wrong_keys() {
        let app = test_app();
        for route in PROTECTED_ROUTES {
            assert_eq!(
                get_status(&app, route).await,
                StatusCode::UNAUTHORIZED,
                "{} without key",
                route
            );
            let wrong = format!("{}?key=nope", route);
            assert_eq!(
                get_status(&app, &wrong).await,
                StatusCode::UNAUTHORIZED,
                "{} with wrong key",
                route
            );
        }
    }

    #[tokio::test]
    async fn test_protected_routes_accept_the_configured_key() {
        let app = test_app();
        for route in PROTECTED_ROUTES {
            let uri = format!("{}?key=secret", route);
            assert_eq!(get_status(&app, &uri).await, StatusCode::OK, "{}", route);
        }
    }

    #[tokio::test]
    async fn test_public_routes_need_no_key() {
        let app = test_app();
        assert_eq!(get_status(&app, "/").await, StatusCode::OK);
        assert_eq!(get_status(&app, "/status").await, StatusCode::OK);
    }
}
